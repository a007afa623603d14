//! CJK numeral conversion for episode/period markers (第三集, 第二十期).

/// Convert a Chinese numeral string to an integer.
///
/// Handles the digits 一..九, the 十 compounds up to 九十九, and the simple
/// 百 multiples that appear in period markers. ASCII digit strings are
/// accepted verbatim. Unparseable input falls back to 1, matching the
/// cascade's "always produce an episode" contract.
#[must_use]
pub fn chinese_to_number(text: &str) -> u32 {
    if text.is_empty() {
        return 1;
    }

    // Arabic digits can slip through the variety-show pattern's numeral class
    if text.chars().all(|c| c.is_ascii_digit()) {
        return text.parse().unwrap_or(1);
    }

    if text == "十" {
        return 10;
    }

    if let Some(rest) = text.strip_prefix('十') {
        // 十一..十九
        return 10 + digit_value(rest);
    }

    if let Some(prefix) = text.strip_suffix('十') {
        // 二十, 三十, ...
        return digit_value(prefix) * 10;
    }

    if let Some((tens, ones)) = text.split_once('十') {
        // 二十一, 三十五, ...
        return digit_value(tens) * 10 + digit_value(ones);
    }

    if let Some(prefix) = text.strip_suffix('百') {
        // 一百, 二百, ...
        let hundreds = digit_value(prefix) * 100;
        if hundreds > 0 {
            return hundreds;
        }
    }

    let value = digit_value(text);
    if value > 0 { value } else { 1 }
}

fn digit_value(text: &str) -> u32 {
    match text {
        "一" => 1,
        "二" => 2,
        "三" => 3,
        "四" => 4,
        "五" => 5,
        "六" => 6,
        "七" => 7,
        "八" => 8,
        "九" => 9,
        _ => 0,
    }
}
