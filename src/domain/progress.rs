/// ドメイン層: 変換中の擬似進捗
///
/// 変換サービスは途中経過を返さないため、一定間隔で一定量ずつ進む
/// 表示専用のインジケータを用いる。実際のサーバー側の進捗を意味しない。
///
/// - 変換開始時に0から始まる
/// - `advance`は上限（100未満）で止まり、自力で100には到達しない
/// - 完了時に`complete`で100へ移る
/// - 失敗・リセット時に`clear`で0へ戻る

/// 擬似進捗の進め方
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressPolicy {
    /// 1ティックあたりの増分（%）
    pub step: u8,
    /// 完了通知前に到達できる上限（%、100未満）
    pub ceiling: u8,
}

impl ProgressPolicy {
    pub fn new(step: u8, ceiling: u8) -> Self {
        Self {
            step: step.max(1),
            ceiling: ceiling.min(99),
        }
    }
}

/// 単調増加する擬似進捗
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntheticProgress {
    policy: ProgressPolicy,
    percent: u8,
}

impl SyntheticProgress {
    pub fn new(policy: ProgressPolicy) -> Self {
        Self { policy, percent: 0 }
    }

    pub fn percent(&self) -> u8 {
        self.percent
    }

    /// 1ティック分進める
    ///
    /// 値が変化した場合のみ`true`を返す（上限到達後は`false`）。
    pub fn advance(&mut self) -> bool {
        let next = self
            .percent
            .saturating_add(self.policy.step)
            .min(self.policy.ceiling);
        if next > self.percent {
            self.percent = next;
            true
        } else {
            false
        }
    }

    /// 完了: 100%へ移る
    pub fn complete(&mut self) {
        self.percent = 100;
    }

    /// 0%へ戻す
    pub fn clear(&mut self) {
        self.percent = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_is_strictly_increasing_until_ceiling() {
        let mut progress = SyntheticProgress::new(ProgressPolicy::new(10, 95));
        let mut seen = vec![progress.percent()];
        while progress.advance() {
            seen.push(progress.percent());
        }

        assert!(seen.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(*seen.last().unwrap(), 95);
        assert!(!progress.advance());
        assert_eq!(progress.percent(), 95);
    }

    #[test]
    fn test_never_reaches_100_by_itself() {
        let mut progress = SyntheticProgress::new(ProgressPolicy::new(50, 100));
        for _ in 0..10 {
            progress.advance();
        }
        assert!(progress.percent() < 100);
    }

    #[test]
    fn test_complete_and_clear() {
        let mut progress = SyntheticProgress::new(ProgressPolicy::new(10, 90));
        progress.advance();
        progress.complete();
        assert_eq!(progress.percent(), 100);

        progress.clear();
        assert_eq!(progress.percent(), 0);
    }

    #[test]
    fn test_zero_step_is_normalized() {
        let policy = ProgressPolicy::new(0, 90);
        assert_eq!(policy.step, 1);
    }
}
