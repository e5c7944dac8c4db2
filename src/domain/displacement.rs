//! 変位計算
//!
//! ポインタの生deltaを、符号補正・感度スケール・振幅クランプ済みの
//! 軸コマンドへ変換する。コアの数値ポリシーはここに集約される。

use crate::domain::config::AxisConfig;
use crate::domain::tracking::TrackingSession;
use crate::domain::types::{Axis, AxisCommand};

/// deltaから軸コマンドを計算する
///
/// # 数値ポリシー（両側クランプ＋下限床）
/// 1. `magnitude = |delta| * sensitivity * incremental_step`
/// 2. 符号は `sign(delta)` に軸のdirection係数を掛けたもの（Inverseで1回だけ反転）
/// 3. 結果の絶対値を `[min_amplitude, max_amplitude]` に収める:
///    - 下限未満は符号を保ったままmin_amplitudeへ切り上げ（ゼロには落とさない）
///    - 上限超過は符号を保ったままmax_amplitudeへ切り詰め
/// 4. delta == 0 はコマンドを一切生成しない（下限床を空入力で発火させない）
pub fn compute(
    delta: f64,
    axis: Axis,
    session: &TrackingSession,
    axis_config: &AxisConfig,
    incremental_step: f64,
) -> Option<AxisCommand> {
    if delta == 0.0 || !delta.is_finite() {
        return None;
    }

    let magnitude = delta.abs() * f64::from(session.sensitivity()) * incremental_step;
    let clamped = magnitude.clamp(axis_config.min_amplitude, axis_config.max_amplitude);
    let sign = delta.signum() * axis_config.direction.factor();

    Some(AxisCommand {
        axis,
        displacement: sign * clamped,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::config::Direction;
    use crate::domain::types::LogicalAction;
    use crate::domain::types::DeviceStatus;

    fn axis_config(direction: Direction) -> AxisConfig {
        AxisConfig {
            direction,
            min_amplitude: 0.001,
            max_amplitude: 20.0,
            instrument: crate::domain::config::InstrumentId::Instrument1,
        }
    }

    fn session_with_sensitivity(sensitivity: u32) -> TrackingSession {
        let mut session = TrackingSession::new(1);
        let status = DeviceStatus::initial();
        for _ in 1..sensitivity {
            session.apply(LogicalAction::IncreaseSensibility, &status);
        }
        session
    }

    #[test]
    fn test_zero_delta_produces_no_command() {
        let session = session_with_sensitivity(1);
        let cfg = axis_config(Direction::Normal);
        assert_eq!(compute(0.0, Axis::X, &session, &cfg, 0.05), None);
    }

    #[test]
    fn test_small_delta_floored_to_min_amplitude() {
        // 0.002 * 1 * 0.05 = 0.0001 < min → 0.001 に切り上げ
        let session = session_with_sensitivity(1);
        let cfg = axis_config(Direction::Normal);
        let cmd = compute(0.002, Axis::X, &session, &cfg, 0.05).unwrap();
        assert_eq!(cmd.displacement, 0.001);
        assert_eq!(cmd.axis, Axis::X);
    }

    #[test]
    fn test_large_delta_capped_to_max_amplitude() {
        // 10 * 100 * 0.05 = 50 > max → 20 に切り詰め
        let session = session_with_sensitivity(100);
        let cfg = axis_config(Direction::Normal);
        let cmd = compute(10.0, Axis::Y, &session, &cfg, 0.05).unwrap();
        assert_eq!(cmd.displacement, 20.0);
    }

    #[test]
    fn test_negative_delta_preserves_sign_through_floor() {
        let session = session_with_sensitivity(1);
        let cfg = axis_config(Direction::Normal);
        let cmd = compute(-0.002, Axis::X, &session, &cfg, 0.05).unwrap();
        assert_eq!(cmd.displacement, -0.001);
    }

    #[test]
    fn test_negative_delta_preserves_sign_through_cap() {
        let session = session_with_sensitivity(100);
        let cfg = axis_config(Direction::Normal);
        let cmd = compute(-10.0, Axis::X, &session, &cfg, 0.05).unwrap();
        assert_eq!(cmd.displacement, -20.0);
    }

    #[test]
    fn test_inverse_direction_flips_sign_with_equal_magnitude() {
        let session = session_with_sensitivity(4);
        let normal = axis_config(Direction::Normal);
        let inverse = axis_config(Direction::Inverse);

        let a = compute(1.5, Axis::X, &session, &normal, 0.05).unwrap();
        let b = compute(1.5, Axis::X, &session, &inverse, 0.05).unwrap();

        assert_eq!(a.displacement, -b.displacement);
        assert_eq!(a.displacement.abs(), b.displacement.abs());
    }

    #[test]
    fn test_in_band_magnitude_passes_through() {
        // 2.0 * 1 * 0.05 = 0.1: 範囲内なのでそのまま
        let session = session_with_sensitivity(1);
        let cfg = axis_config(Direction::Normal);
        let cmd = compute(2.0, Axis::X, &session, &cfg, 0.05).unwrap();
        assert!((cmd.displacement - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_magnitude_always_within_band_for_nonzero_delta() {
        let cfg = axis_config(Direction::Normal);
        for sensitivity in [1u32, 2, 10, 1000] {
            let session = session_with_sensitivity(sensitivity);
            for delta in [-1000.0, -1.0, -1e-9, 1e-9, 0.5, 314.0] {
                let cmd = compute(delta, Axis::X, &session, &cfg, 0.05).unwrap();
                let mag = cmd.displacement.abs();
                assert!(
                    (cfg.min_amplitude..=cfg.max_amplitude).contains(&mag),
                    "magnitude {} out of band for delta={} sensitivity={}",
                    mag,
                    delta,
                    sensitivity
                );
            }
        }
    }

    #[test]
    fn test_non_finite_delta_is_dropped() {
        let session = session_with_sensitivity(1);
        let cfg = axis_config(Direction::Normal);
        assert_eq!(compute(f64::NAN, Axis::X, &session, &cfg, 0.05), None);
        assert_eq!(compute(f64::INFINITY, Axis::X, &session, &cfg, 0.05), None);
    }
}
