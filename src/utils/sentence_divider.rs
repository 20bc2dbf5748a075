const SENTENCE_ENDINGS: [char; 6] = ['.', '!', '?', '。', '！', '？'];

/// Split text into sentences, keeping each sentence's closing punctuation
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();

    for ch in text.chars() {
        current.push(ch);
        if SENTENCE_ENDINGS.contains(&ch) {
            push_trimmed(&mut sentences, &current);
            current.clear();
        }
    }
    push_trimmed(&mut sentences, &current);

    sentences
}

fn push_trimmed(sentences: &mut Vec<String>, text: &str) {
    let trimmed = text.trim();
    if !trimmed.is_empty() && !trimmed.chars().all(|c| SENTENCE_ENDINGS.contains(&c)) {
        sentences.push(trimmed.to_string());
    }
}
