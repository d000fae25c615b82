//! Context block and prompt for the completion fallback.

use nttv_core::types::Passage;

/// Numbered citation blocks within `max_chars`. A block that does not fit
/// is skipped; later, shorter ones may still go in. Numbers follow the
/// passage order so they line up with the cited sources.
pub fn build_context(passages: &[Passage], max_chars: usize) -> String {
    let mut out = String::new();
    let mut total = 0;
    for (i, p) in passages.iter().enumerate() {
        let mut tag = format!("[{}] {}", i + 1, p.source_name());
        if let Some(page) = p.page {
            tag.push_str(&format!(" (p. {page})"));
        }
        let block = format!("{tag}\n{}\n\n---\n", p.text);
        let len = block.chars().count();
        if total + len > max_chars {
            continue;
        }
        out.push_str(&block);
        total += len;
    }
    out
}

pub fn build_prompt(context: &str, question: &str) -> String {
    format!(
        "You must answer using ONLY the context below.\n\
         Be concise but complete; avoid filler.\n\n\
         Context:\n{context}\n\n\
         Question: {question}\n\n\
         Answer:"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use nttv_core::types::ChunkRecord;

    fn passage(source: &str, text: &str, page: Option<u32>) -> Passage {
        Passage::retrieved(&ChunkRecord { text: text.into(), source: source.into(), page, priority: 1 }, 0.5)
    }

    #[test]
    fn tags_blocks_with_basename_and_page() {
        let ctx = build_context(&[passage("data/Glossary.txt", "Bo - staff", Some(3)), passage("a/b/c.md", "x", None)], 6000);
        assert_eq!(ctx, "[1] Glossary.txt (p. 3)\nBo - staff\n\n---\n[2] c.md\nx\n\n---\n");
    }

    #[test]
    fn keeps_within_the_character_budget() {
        let long = "y".repeat(50);
        let ctx = build_context(&[passage("a.txt", "short", None), passage("b.txt", &long, None)], 40);
        assert_eq!(ctx, "[1] a.txt\nshort\n\n---\n");
        assert!(build_context(&[passage("b.txt", &long, None)], 10).is_empty());
    }

    #[test]
    fn oversized_block_does_not_hide_later_ones() {
        let long = "y".repeat(50);
        let ctx = build_context(&[passage("b.txt", &long, None), passage("a.txt", "short", None)], 40);
        assert_eq!(ctx, "[2] a.txt\nshort\n\n---\n");
    }

    #[test]
    fn prompt_layout() {
        let p = build_prompt("CTX", "Q?");
        assert!(p.starts_with("You must answer using ONLY the context below.\n"));
        assert!(p.ends_with("Context:\nCTX\n\nQuestion: Q?\n\nAnswer:"));
    }
}
