//! Formatting of clip lengths for the display
//!
//! Lengths are `Option<f64>`; an absent length renders as `-`.
//! Integer parts truncate toward zero and remainders are always
//! non-negative, so small negative lengths render as `0:59`-style values
//! rather than panicking or printing a sign.

/// Seconds as `M:SS`
pub fn convert_length_to_mins_secs(length_in_secs: Option<f64>) -> String {
    let Some(length) = length_in_secs else {
        return "-".to_string();
    };
    let mins = (length / 60.0).trunc() as i64;
    let secs = length.rem_euclid(60.0).trunc() as i64;
    format!("{}:{:02}", mins, secs)
}

/// Beats at `tempo` BPM as `M:SS`
pub fn convert_beats_to_mins_secs(length_in_beats: Option<f64>, tempo: f64) -> String {
    convert_length_to_mins_secs(length_in_beats.map(|beats| beats / tempo * 60.0))
}

/// Beats as `bars.beats.sixteenths`, four beats to the bar
pub fn convert_length_to_bars_beats_sixteenths(length: Option<f64>) -> String {
    let Some(length) = length else {
        return "-".to_string();
    };
    let bars = (length / 4.0).trunc() as i64;
    let beats = length.rem_euclid(4.0).trunc() as i64;
    let sixteenths = (length * 4.0).rem_euclid(4.0).trunc() as i64;
    format!("{}.{}.{}", bars, beats, sixteenths)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mins_secs_pads_seconds() {
        assert_eq!(convert_length_to_mins_secs(Some(90.0)), "1:30");
        assert_eq!(convert_length_to_mins_secs(Some(5.9)), "0:05");
        assert_eq!(convert_length_to_mins_secs(Some(3600.0)), "60:00");
    }

    #[test]
    fn test_absent_length_renders_dash() {
        assert_eq!(convert_length_to_mins_secs(None), "-");
        assert_eq!(convert_beats_to_mins_secs(None, 120.0), "-");
        assert_eq!(convert_length_to_bars_beats_sixteenths(None), "-");
    }

    #[test]
    fn test_beats_use_tempo() {
        // 180 beats at 120 BPM is a minute and a half
        assert_eq!(convert_beats_to_mins_secs(Some(180.0), 120.0), "1:30");
        assert_eq!(convert_beats_to_mins_secs(Some(4.0), 60.0), "0:04");
    }

    #[test]
    fn test_bars_beats_sixteenths() {
        assert_eq!(convert_length_to_bars_beats_sixteenths(Some(8.0)), "2.0.0");
        assert_eq!(convert_length_to_bars_beats_sixteenths(Some(5.5)), "1.1.2");
        assert_eq!(convert_length_to_bars_beats_sixteenths(Some(0.25)), "0.0.1");
    }
}
