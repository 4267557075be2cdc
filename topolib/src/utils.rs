//! Various utility functions.

/// Given 2 sorted slices, returns a vector of common elements in sorted order.
pub fn sorted_intersection<T: Ord + Clone>(a: &[T], b: &[T]) -> Vec<T> {
    let mut output: Vec<T> = Vec::new();
    output.reserve_exact(std::cmp::min(a.len(), b.len()));
    let mut a = a.iter();
    let mut b = b.iter();
    let (mut x, mut y) = match (a.next(), b.next()) {
        (Some(x), Some(y)) => (x, y),
        _ => return output,
    };
    loop {
        match x.cmp(y) {
            std::cmp::Ordering::Less => match a.next() {
                Some(value) => x = value,
                None => break,
            },
            std::cmp::Ordering::Equal => {
                output.push(x.clone());
                match (a.next(), b.next()) {
                    (Some(nx), Some(ny)) => {
                        x = nx;
                        y = ny;
                    }
                    _ => break,
                }
            }
            std::cmp::Ordering::Greater => match b.next() {
                Some(value) => y = value,
                None => break,
            },
        }
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sorted_intersection_test() {
        assert_eq!(sorted_intersection(&[1, 2, 3], &[]), Vec::<i32>::new());
        assert_eq!(sorted_intersection(&[1, 2, 3], &[3]), vec![3]);
        assert_eq!(sorted_intersection(&[3], &[1, 2, 3]), vec![3]);
        assert_eq!(sorted_intersection(&[666], &[1, 2, 3]), Vec::<i32>::new());
        assert_eq!(sorted_intersection(&[2, 3], &[2, 3]), vec![2, 3]);
        assert_eq!(
            sorted_intersection(&[1, 2, 3, 15], &[11, 12, 13, 15]),
            vec![15]
        );
        assert_eq!(
            sorted_intersection(&[0, 4, 5, 9], &[1, 4, 5, 8, 9]),
            vec![4, 5, 9]
        );
    }
}
