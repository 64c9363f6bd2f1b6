use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter, Result as FmtResult};

/// One sampling point of a running evaluation.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Snapshot {
    pub instances_seen: u64,
    pub accuracy: f64,
    pub kappa: f64,
    pub ram_hours: f64,
    pub seconds: f64,
    /// Evaluator-specific metrics (precision/recall/f1, mae/rmse, ...).
    pub extras: BTreeMap<String, f64>,
}

impl Snapshot {
    #[inline]
    fn fmtv(v: f64) -> String {
        if v.is_nan() {
            "NaN".into()
        } else {
            format!("{:.6}", v)
        }
    }
}

impl Display for Snapshot {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(
            f,
            "seen={}, acc={}, kappa={}, ram_h={}, t={:.6}s",
            self.instances_seen,
            Self::fmtv(self.accuracy),
            Self::fmtv(self.kappa),
            self.ram_hours,
            self.seconds
        )?;

        const ORDER: &[&str] = &["precision", "recall", "f1", "mae", "rmse"];

        for key in ORDER {
            if let Some(v) = self.extras.get(*key) {
                write!(f, ", {}={}", key, Self::fmtv(*v))?;
            }
        }

        for (k, v) in self.extras.iter() {
            if ORDER.iter().any(|kk| *kk == k.as_str()) {
                continue;
            }
            write!(f, ", {}={}", k, Self::fmtv(*v))?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_orders_known_extras_first() {
        let mut extras = BTreeMap::new();
        extras.insert("zz_custom".to_string(), 1.0);
        extras.insert("mae".to_string(), 0.5);

        let snap = Snapshot {
            instances_seen: 10,
            accuracy: f64::NAN,
            kappa: 0.0,
            ram_hours: 0.0,
            seconds: 0.25,
            extras,
        };

        let line = snap.to_string();
        assert!(line.starts_with("seen=10, acc=NaN"));
        let mae_at = line.find("mae=").unwrap();
        let custom_at = line.find("zz_custom=").unwrap();
        assert!(mae_at < custom_at);
    }
}
