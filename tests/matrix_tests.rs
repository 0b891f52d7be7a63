use schedule_tracks::{LayoutError, Matrix};

fn m(rows: &[&[i64]]) -> Matrix<i64> {
    Matrix::new(rows.iter().map(|r| r.to_vec()).collect()).unwrap()
}

#[test]
fn new_rejects_empty_and_ragged_rows() {
    assert!(matches!(
        Matrix::<i64>::new(vec![]),
        Err(LayoutError::StructuralRange(_))
    ));
    assert!(matches!(
        Matrix::<i64>::new(vec![vec![]]),
        Err(LayoutError::StructuralRange(_))
    ));
    assert!(matches!(
        Matrix::new(vec![vec![1i64, 2], vec![3]]),
        Err(LayoutError::StructuralRange(_))
    ));
}

#[test]
fn multiply_three_by_two_with_two_by_three() {
    let a = m(&[&[1, 2], &[3, 4], &[5, 6]]);
    let b = m(&[&[7, 8, 9], &[10, 11, 12]]);

    let product = a.multiply(&b).unwrap();
    assert_eq!(product, m(&[&[27, 30, 33], &[61, 68, 75], &[95, 106, 117]]));
    assert_eq!(product.number_of_rows(), 3);
    assert_eq!(product.number_of_columns(), 3);
}

#[test]
fn multiply_rejects_mismatched_dimensions() {
    let a = m(&[&[1, 2, 3], &[4, 5, 6]]);
    let err = a.multiply(&a).unwrap_err();
    assert!(matches!(err, LayoutError::StructuralRange(_)));
}

#[test]
fn add_and_subtract_are_element_wise() {
    let a = m(&[&[1, 2], &[3, 4]]);
    let b = m(&[&[10, 20], &[30, 40]]);

    assert_eq!(a.add(&b).unwrap(), m(&[&[11, 22], &[33, 44]]));
    assert_eq!(b.subtract(&a).unwrap(), m(&[&[9, 18], &[27, 36]]));
    assert!(a.add(&m(&[&[1, 2, 3]])).is_err());
    assert!(a.subtract(&m(&[&[1], &[2]])).is_err());
}

#[test]
fn transpose_twice_is_identity() {
    let a = m(&[&[1, 2, 3], &[4, 5, 6]]);
    let t = a.transpose();

    assert_eq!(t, m(&[&[1, 4], &[2, 5], &[3, 6]]));
    assert_eq!(t.transpose(), a);
}

#[test]
fn accessors_check_bounds() {
    let a = m(&[&[1, 2], &[3, 4], &[5, 6]]);

    assert_eq!(a.get_row(1).unwrap(), &[3, 4]);
    assert_eq!(a.get_column(1).unwrap(), vec![2, 4, 6]);
    assert_eq!(a.get_element_at_position(2, 0).unwrap(), 5);

    assert!(matches!(a.get_row(3), Err(LayoutError::StructuralRange(_))));
    assert!(matches!(a.get_column(2), Err(LayoutError::StructuralRange(_))));
    assert!(matches!(
        a.get_element_at_position(0, 2),
        Err(LayoutError::StructuralRange(_))
    ));
}

#[test]
fn zero_detection() {
    assert!(Matrix::<i64>::zeros(2, 3).unwrap().is_zero());
    assert!(!m(&[&[0, 1]]).is_zero());
}
