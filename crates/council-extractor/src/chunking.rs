//! Splitting long minutes into LLM-sized pieces

/// Splits minutes text on paragraph boundaries
///
/// Text extracted from PDFs often has no blank lines at all; in that case
/// single lines are used as the unit instead.
pub struct MinutesChunker {
    max_chunk_size: usize,
}

impl MinutesChunker {
    /// Create a new chunker
    pub fn new(max_chunk_size: usize) -> Self {
        Self {
            max_chunk_size: max_chunk_size.max(1),
        }
    }

    /// Chunk the given text
    pub fn chunk(&self, text: &str) -> Vec<String> {
        if text.len() <= self.max_chunk_size {
            return vec![text.to_string()];
        }

        let paragraphs: Vec<&str> = text
            .split("\n\n")
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect();

        if paragraphs.len() > 1 {
            self.combine_until_limit(&paragraphs, "\n\n")
        } else {
            let lines: Vec<&str> = text
                .lines()
                .map(str::trim_end)
                .filter(|l| !l.trim().is_empty())
                .collect();
            self.combine_until_limit(&lines, "\n")
        }
    }

    /// Combine elements until they reach the size limit
    fn combine_until_limit(&self, elements: &[&str], separator: &str) -> Vec<String> {
        let mut chunks = Vec::new();
        let mut current = String::new();

        for element in elements {
            if current.len() + element.len() + separator.len() > self.max_chunk_size {
                if !current.is_empty() {
                    chunks.push(current.trim().to_string());
                    current = String::new();
                }

                if element.len() > self.max_chunk_size {
                    chunks.extend(split_at_char_limit(element, self.max_chunk_size));
                    continue;
                }
            }
            current.push_str(element);
            current.push_str(separator);
        }

        if !current.trim().is_empty() {
            chunks.push(current.trim().to_string());
        }

        chunks
    }
}

/// Split text into pieces of at most `limit` bytes without cutting a UTF-8 character
fn split_at_char_limit(text: &str, limit: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut start = 0;

    while start < text.len() {
        let mut end = (start + limit).min(text.len());
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        if end == start {
            // limit smaller than one character: take the whole character
            end = start + text[start..].chars().next().map_or(1, char::len_utf8);
        }
        chunks.push(text[start..end].to_string());
        start = end;
    }

    chunks
}
