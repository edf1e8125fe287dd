use mnemosyne_shared::{AppError, APP_CONFIG};

const L2_NORM_TOLERANCE: f32 = 1e-6;

/// Process embedding vector to ensure it's L2 normalized with exactly
/// `APP_CONFIG.embedding_dimensions` dimensions.
///
/// - If dim > target: truncate and L2 normalize.
/// - If dim == target: check if already L2 normalized, normalize if not.
/// - If dim < target: return error — the provider returned less than promised.
pub fn process_embedding(mut vec: Vec<f32>) -> Result<Vec<f32>, AppError> {
  let target = APP_CONFIG.embedding_dimensions as usize;
  match vec.len() {
    d if d > target => {
      vec.truncate(target);
      l2_normalize(&mut vec);
      Ok(vec)
    }
    d if d == target => {
      let norm_sq: f32 = vec.iter().map(|x| x * x).sum();
      if (norm_sq - 1.0).abs() > L2_NORM_TOLERANCE {
        l2_normalize(&mut vec);
      }
      Ok(vec)
    }
    d => Err(AppError::new(anyhow::anyhow!(
      "embedding dimension {} is less than required {}",
      d,
      target
    ))),
  }
}

fn l2_normalize(vec: &mut [f32]) {
  let norm_sq: f32 = vec.iter().map(|x| x * x).sum();
  let norm = norm_sq.sqrt();
  if norm > 1e-12 {
    for x in vec.iter_mut() {
      *x /= norm;
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn normalizes_exact_dimension() {
    let target = APP_CONFIG.embedding_dimensions as usize;
    let v = vec![1.0_f32; target];
    let processed = process_embedding(v).unwrap();
    let norm: f32 = processed.iter().map(|x| x * x).sum();
    assert!((norm - 1.0).abs() < 1e-4);
  }

  #[test]
  fn rejects_short_vector() {
    let err = process_embedding(vec![1.0, 2.0]);
    assert!(err.is_err());
  }
}
