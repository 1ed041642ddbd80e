use crate::error::{Error, Result};

fn check_same_len(a: &[f64], b: &[f64], context: &'static str) -> Result<()> {
    if a.len() != b.len() {
        return Err(Error::mismatch(context, a.len(), b.len()));
    }
    Ok(())
}

/// Sum of element-wise products.
pub fn dot(a: &[f64], b: &[f64]) -> Result<f64> {
    check_same_len(a, b, "dot product")?;
    Ok(a.iter().zip(b).map(|(x, y)| x * y).sum())
}

pub fn add(a: &[f64], b: &[f64]) -> Result<Vec<f64>> {
    check_same_len(a, b, "vector add")?;
    Ok(a.iter().zip(b).map(|(x, y)| x + y).collect())
}

pub fn sub(a: &[f64], b: &[f64]) -> Result<Vec<f64>> {
    check_same_len(a, b, "vector sub")?;
    Ok(a.iter().zip(b).map(|(x, y)| x - y).collect())
}

/// `acc += v`, checked before any element changes.
pub fn add_assign(acc: &mut [f64], v: &[f64]) -> Result<()> {
    check_same_len(acc, v, "vector add")?;
    acc.iter_mut().zip(v).for_each(|(a, x)| *a += x);
    Ok(())
}

/// Element-wise (Hadamard) product of two same-length vectors.
pub fn hadamard(a: &[f64], b: &[f64]) -> Result<Vec<f64>> {
    check_same_len(a, b, "hadamard product")?;
    Ok(a.iter().zip(b).map(|(x, y)| x * y).collect())
}

/// Index of the largest element; ties resolve to the first. `None` when empty.
pub fn argmax(v: &[f64]) -> Option<usize> {
    v.iter()
        .enumerate()
        .fold(None, |best: Option<(usize, f64)>, (i, &x)| match best {
            Some((_, b)) if b >= x => best,
            _ => Some((i, x)),
        })
        .map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dot_requires_equal_lengths() {
        assert_eq!(dot(&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0]).unwrap(), 32.0);
        assert!(matches!(
            dot(&[1.0], &[1.0, 2.0]),
            Err(Error::DimensionMismatch { expected: 1, actual: 2, .. })
        ));
    }

    #[test]
    fn add_and_sub() {
        assert_eq!(add(&[1.0, 2.0], &[0.5, -2.0]).unwrap(), vec![1.5, 0.0]);
        assert_eq!(sub(&[1.0, 2.0], &[0.5, -2.0]).unwrap(), vec![0.5, 4.0]);
        assert!(sub(&[1.0], &[]).is_err());
    }

    #[test]
    fn add_assign_is_atomic_on_mismatch() {
        let mut acc = vec![1.0, 1.0];
        assert!(add_assign(&mut acc, &[1.0, 1.0, 1.0]).is_err());
        assert_eq!(acc, vec![1.0, 1.0]);
        add_assign(&mut acc, &[0.5, 2.0]).unwrap();
        assert_eq!(acc, vec![1.5, 3.0]);
    }

    #[test]
    fn argmax_picks_first_maximum() {
        assert_eq!(argmax(&[0.1, 0.7, 0.7, 0.2]), Some(1));
        assert_eq!(argmax(&[]), None);
    }
}
