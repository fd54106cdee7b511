//! Small UI helpers: human-readable numbers, truncation, alignment, bar gauges.

/// Binary prefixes for byte counters (IEEE 1541).
pub fn human_bytes(b: u64) -> String {
    const K: f64 = 1024.0;
    let v = b as f64;
    if v < K {
        return format!("{b}");
    }
    let kb = v / K;
    if kb < K {
        return format!("{kb:.1}K");
    }
    let mb = kb / K;
    if mb < K {
        return format!("{mb:.1}M");
    }
    let gb = mb / K;
    if gb < K {
        return format!("{gb:.1}G");
    }
    format!("{:.1}T", gb / K)
}

/// Metric prefixes for large counters.
pub fn human_metric(n: u64) -> String {
    const K: f64 = 1000.0;
    let v = n as f64;
    if v < K {
        return n.to_string();
    }
    if v < K * K {
        return format!("{:.1}k", v / K);
    }
    if v < K * K * K {
        return format!("{:.1}M", v / (K * K));
    }
    format!("{:.1}G", v / (K * K * K))
}

/// Largest whole unit: `45s`, `3m`, `2h`, `9d`.
pub fn human_time(secs: u64) -> String {
    const UNITS: [(u64, char); 3] = [(86_400, 'd'), (3_600, 'h'), (60, 'm')];
    for (size, suffix) in UNITS {
        if secs >= size {
            return format!("{}{suffix}", secs / size);
        }
    }
    format!("{secs}s")
}

/// Cut `s` to `max` chars keeping the tail, e.g. `..rver-long-name`.
pub fn trim(s: &str, max: usize) -> String {
    let len = s.chars().count();
    if len <= max {
        return s.to_string();
    }
    match max {
        0 => String::new(),
        1 => s.chars().take(1).collect(),
        2..=5 => ".".repeat(max.min(3)),
        _ => {
            let tail: String = s.chars().skip(len - (max - 2)).collect();
            format!("..{tail}")
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Right,
}

/// Pad (or trim) `s` to exactly `width` chars.
pub fn pad(s: &str, width: usize, align: Align) -> String {
    let s = trim(s, width);
    match align {
        Align::Left => format!("{s:<width$}"),
        Align::Right => format!("{s:>width$}"),
    }
}

/// `[|||||      12/100]` style gauge with the value drawn inside the bar.
pub fn status_bar(cur: u64, max: u64, width: usize) -> String {
    let cur = cur.min(max);
    let status = format!("{cur}/{max}");
    let space = width.saturating_sub(2);
    let used = if max > 0 {
        (space as f64 * cur as f64 / max as f64) as usize
    } else {
        0
    };
    let mut bar: String = "|".repeat(used.min(space));
    bar.push_str(&" ".repeat(space - used.min(space)));
    let keep = space.saturating_sub(status.len());
    let mut out: String = bar.chars().take(keep).collect();
    out.push_str(&status);
    format!("[{out}]")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn humanizes_by_kind() {
        assert_eq!(human_bytes(512), "512");
        assert_eq!(human_bytes(2048), "2.0K");
        assert_eq!(human_bytes(5 * 1024 * 1024), "5.0M");
        assert_eq!(human_metric(999), "999");
        assert_eq!(human_metric(1_500), "1.5k");
        assert_eq!(human_metric(2_500_000), "2.5M");
        assert_eq!(human_time(59), "59s");
        assert_eq!(human_time(3_600 * 5 + 10), "5h");
        assert_eq!(human_time(86_400 * 3), "3d");
    }

    #[test]
    fn trim_keeps_tail() {
        assert_eq!(trim("backend-server-01", 8), "..ver-01");
        assert_eq!(trim("abcdef", 4), "...");
        assert_eq!(trim("abc", 1), "a");
        assert_eq!(trim("abc", 5), "abc");
    }

    #[test]
    fn pad_aligns() {
        assert_eq!(pad("UP", 4, Align::Left), "UP  ");
        assert_eq!(pad("7", 3, Align::Right), "  7");
    }

    #[test]
    fn bar_embeds_status() {
        let b = status_bar(50, 100, 22);
        assert_eq!(b.len(), 22);
        assert!(b.starts_with("[||||||||||"));
        assert!(b.ends_with("50/100]"));
        assert_eq!(status_bar(0, 0, 10), "[     0/0]");
    }
}
