//! 链路带宽分配策略
//!
//! `Equal` 把容量均分给链路上的所有 flow；`MaxMin` 在 per-chunk 速率上限
//! 存在时做 water-filling，没有上限时与 `Equal` 结果相同。

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SharingPolicy {
    #[default]
    Equal,
    MaxMin,
}

impl SharingPolicy {
    pub fn parse(raw: &str) -> Result<Self, String> {
        let compact: String = raw
            .trim()
            .to_lowercase()
            .chars()
            .filter(|ch| *ch != '_' && *ch != '-')
            .collect();
        match compact.as_str() {
            "equal" | "fair" => Ok(Self::Equal),
            "maxmin" => Ok(Self::MaxMin),
            _ => Err(format!("unknown sharing policy: {raw}")),
        }
    }

    /// 把 `capacity` 分给各 flow，返回与 `caps` 同序的份额。
    ///
    /// `caps[i]` 是第 i 个 flow 的速率上限（`None` 表示不限）。`Equal` 忽略上限。
    pub fn allocate(self, capacity: f64, caps: &[Option<f64>]) -> Vec<f64> {
        if caps.is_empty() {
            return Vec::new();
        }
        match self {
            Self::Equal => vec![capacity / caps.len() as f64; caps.len()],
            Self::MaxMin => water_fill(capacity, caps),
        }
    }
}

fn cap_of(cap: Option<f64>) -> f64 {
    cap.unwrap_or(f64::INFINITY)
}

fn water_fill(capacity: f64, caps: &[Option<f64>]) -> Vec<f64> {
    // 上限小的先分配；相同上限按下标，保证确定性
    let mut order: Vec<usize> = (0..caps.len()).collect();
    order.sort_by(|&a, &b| cap_of(caps[a]).total_cmp(&cap_of(caps[b])).then(a.cmp(&b)));

    let mut shares = vec![0.0; caps.len()];
    let mut left = capacity;
    let mut unassigned = caps.len();
    for idx in order {
        let fair = left.max(0.0) / unassigned as f64;
        let share = fair.min(cap_of(caps[idx]));
        shares[idx] = share;
        left -= share;
        unassigned -= 1;
    }
    shares
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_policy_aliases() {
        assert_eq!(SharingPolicy::parse("equal").unwrap(), SharingPolicy::Equal);
        assert_eq!(SharingPolicy::parse("max_min").unwrap(), SharingPolicy::MaxMin);
        assert_eq!(SharingPolicy::parse("Max-Min").unwrap(), SharingPolicy::MaxMin);
        assert!(SharingPolicy::parse("weighted").is_err());
    }

    #[test]
    fn equal_ignores_caps() {
        let shares = SharingPolicy::Equal.allocate(12.0, &[Some(1.0), None, None]);
        assert_eq!(shares, vec![4.0, 4.0, 4.0]);
    }

    #[test]
    fn max_min_redistributes_unused_capacity() {
        let shares = SharingPolicy::MaxMin.allocate(12.0, &[Some(2.0), None, None]);
        assert_eq!(shares, vec![2.0, 5.0, 5.0]);
        assert!(shares.iter().sum::<f64>() <= 12.0);
    }

    #[test]
    fn max_min_without_caps_matches_equal() {
        let caps = [None, None, None, None];
        assert_eq!(
            SharingPolicy::MaxMin.allocate(10.0, &caps),
            SharingPolicy::Equal.allocate(10.0, &caps)
        );
    }

    #[test]
    fn max_min_all_capped_leaves_headroom() {
        let shares = SharingPolicy::MaxMin.allocate(10.0, &[Some(1.0), Some(3.0)]);
        assert_eq!(shares, vec![1.0, 3.0]);
    }
}
