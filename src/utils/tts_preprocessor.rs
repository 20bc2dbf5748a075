/// Which markup to strip from prompt text before it is spoken
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpeechFilter {
    pub remove_special_char: bool,
    pub ignore_brackets: bool,
    pub ignore_parentheses: bool,
    pub ignore_asterisks: bool,
    pub ignore_angle_brackets: bool,
}

impl Default for SpeechFilter {
    fn default() -> Self {
        Self {
            remove_special_char: false,
            ignore_brackets: true,
            ignore_parentheses: false,
            ignore_asterisks: true,
            ignore_angle_brackets: true,
        }
    }
}

/// Filter prompt text for speech synthesis, collapsing leftover whitespace
pub fn tts_filter(text: &str, filter: &SpeechFilter) -> String {
    let mut result = text.to_string();

    if filter.ignore_asterisks {
        result = strip_delimited(&result, '*', '*');
    }

    if filter.ignore_brackets {
        result = strip_delimited(&result, '[', ']');
    }

    if filter.ignore_parentheses {
        result = strip_delimited(&result, '(', ')');
    }

    if filter.ignore_angle_brackets {
        result = strip_delimited(&result, '<', '>');
    }

    if filter.remove_special_char {
        result = result
            .chars()
            .filter(|c| c.is_alphanumeric() || c.is_whitespace() || ".,!?;:'".contains(*c))
            .collect();
    }

    result.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Remove every `start ... end` span. Unbalanced openers keep the rest of the text.
fn strip_delimited(text: &str, start: char, end: char) -> String {
    if start == end {
        let parts: Vec<&str> = text.split(start).collect();
        if parts.len() % 2 == 0 {
            // Odd number of markers: leave the text alone
            return text.to_string();
        }
        return parts.iter().step_by(2).copied().collect();
    }

    let mut result = String::with_capacity(text.len());
    let mut pending = String::new();
    let mut depth = 0usize;

    for ch in text.chars() {
        if ch == start {
            depth += 1;
            pending.push(ch);
        } else if ch == end && depth > 0 {
            depth -= 1;
            if depth == 0 {
                pending.clear();
            } else {
                pending.push(ch);
            }
        } else if depth > 0 {
            pending.push(ch);
        } else {
            result.push(ch);
        }
    }

    result.push_str(&pending);
    result
}
