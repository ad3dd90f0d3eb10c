use chrono::Duration;

pub fn format_duration(duration: Duration) -> String {
    let total_seconds = duration.num_seconds().max(0);
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

pub fn clamp_name(value: &str, width: usize) -> String {
    let value_len = value.chars().count();
    if value_len <= width {
        return format!("{value:<width$}", width = width);
    }
    let trimmed = value
        .chars()
        .take(width.saturating_sub(2))
        .collect::<String>();
    format!("{trimmed}..")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_duration_renders_whole_seconds() {
        assert_eq!(format_duration(Duration::seconds(0)), "00:00:00");
        assert_eq!(format_duration(Duration::seconds(2400)), "00:40:00");
        assert_eq!(format_duration(Duration::seconds(21600)), "06:00:00");
        assert_eq!(format_duration(Duration::seconds(-5)), "00:00:00");
    }

    #[test]
    fn clamp_name_pads_and_truncates() {
        assert_eq!(clamp_name("abc", 5), "abc  ");
        assert_eq!(clamp_name("abcdefgh", 5), "abc..");
    }
}
