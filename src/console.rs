//! Interactive console flows
//!
//! The chat REPL and the multi-line prompt editor for batch generation. All
//! flows read from a generic `BufRead` and write to a generic `Write` so they
//! can be driven by tests without a terminal.

use crate::ai::ChatService;
use crate::{Error, Result};
use std::io::{BufRead, Write};

/// Where the editor currently is in the entry flow. Confirmation is the
/// third step, handled by [`read_batch_request`] after entry finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum EditorState {
    /// Between prompts or blocks; a blank line here completes a prompt.
    #[default]
    CollectingLine,
    /// Inside a multi-line block; the next blank line closes it.
    CollectingBlock,
}

/// Outcome of feeding one input line to the editor.
#[derive(Debug, PartialEq, Eq)]
pub enum EditorEvent {
    /// Keep feeding lines.
    Continue,
    /// `done`: entry finished with the collected prompts.
    Finished(Vec<String>),
    /// `quit`/`exit`: abandon the flow.
    Aborted,
}

/// Multi-line prompt entry.
///
/// Prompts are separated by blank lines: the first blank line closes an open
/// block, the second completes the prompt. `done` finishes entry, flushing
/// anything still in progress.
#[derive(Debug, Default)]
pub struct PromptEditor {
    state: EditorState,
    prompts: Vec<String>,
    /// Completed segments of the prompt being assembled.
    segments: Vec<String>,
    /// Lines of the block being assembled.
    block: Vec<String>,
}

impl PromptEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_line(&mut self, line: &str) -> EditorEvent {
        let line = line.trim();

        if line.eq_ignore_ascii_case("quit") || line.eq_ignore_ascii_case("exit") {
            return EditorEvent::Aborted;
        }

        if line.eq_ignore_ascii_case("done") {
            self.close_block();
            self.close_prompt();
            return EditorEvent::Finished(std::mem::take(&mut self.prompts));
        }

        if line.is_empty() {
            match self.state {
                EditorState::CollectingBlock => self.close_block(),
                EditorState::CollectingLine => self.close_prompt(),
            }
            return EditorEvent::Continue;
        }

        self.block.push(line.to_string());
        self.state = EditorState::CollectingBlock;
        EditorEvent::Continue
    }

    fn close_block(&mut self) {
        if !self.block.is_empty() {
            self.segments.push(self.block.join(" "));
            self.block.clear();
        }
        self.state = EditorState::CollectingLine;
    }

    fn close_prompt(&mut self) {
        if !self.segments.is_empty() {
            self.prompts.push(self.segments.join(" "));
            self.segments.clear();
        }
    }
}

/// Everything the interactive entry flow produces before a batch can start.
#[derive(Debug, PartialEq, Eq)]
pub struct BatchRequest {
    pub prompts: Vec<String>,
    pub images_per_prompt: u32,
}

/// Clamp the requested per-prompt image count to 1-4; unparseable input
/// falls back to a single image.
pub fn parse_image_count(input: &str) -> u32 {
    input
        .trim()
        .parse::<u32>()
        .map(|n| n.clamp(1, 4))
        .unwrap_or(1)
}

/// Collect prompts, confirm them, and ask for the per-prompt image count.
///
/// Returns `None` when the user aborts (or input ends).
pub fn read_batch_request<R: BufRead, W: Write>(
    input: &mut R,
    out: &mut W,
) -> Result<Option<BatchRequest>> {
    loop {
        writeln!(out, "\n=== Enter prompts ===")?;
        writeln!(
            out,
            "Separate prompts with a blank line (one extra blank line ends a multi-line prompt)."
        )?;
        writeln!(out, "Type 'done' to finish, 'quit' or 'exit' to leave.")?;

        let mut editor = PromptEditor::new();
        let prompts = loop {
            let mut line = String::new();
            if input.read_line(&mut line)? == 0 {
                return Ok(None);
            }
            match editor.push_line(&line) {
                EditorEvent::Continue => {}
                EditorEvent::Aborted => {
                    writeln!(out, "Leaving.")?;
                    return Ok(None);
                }
                EditorEvent::Finished(prompts) => break prompts,
            }
        };

        if prompts.is_empty() {
            writeln!(out, "Please enter at least one prompt.")?;
            continue;
        }

        writeln!(out, "\n=== Entered prompts ===")?;
        for (i, prompt) in prompts.iter().enumerate() {
            writeln!(out, "\nPrompt {}:", i + 1)?;
            writeln!(out, "{}", prompt)?;
        }

        write!(out, "\nGenerate images for these prompts? (y/n): ")?;
        out.flush()?;
        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        if !line.trim().eq_ignore_ascii_case("y") {
            continue;
        }

        write!(out, "\nImages per prompt (1-4): ")?;
        out.flush()?;
        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Ok(None);
        }

        return Ok(Some(BatchRequest {
            prompts,
            images_per_prompt: parse_image_count(&line),
        }));
    }
}

/// Run the one-question-per-turn chat loop.
pub async fn run_chat<R: BufRead, W: Write>(
    chat: &dyn ChatService,
    input: &mut R,
    out: &mut W,
) -> Result<()> {
    writeln!(out, "\n=== Gemini chat ===")?;
    writeln!(out, "Type 'quit' or 'exit' to leave.")?;

    loop {
        write!(out, "\nYour question: ")?;
        out.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Ok(());
        }
        let prompt = line.trim();

        if prompt.eq_ignore_ascii_case("quit") || prompt.eq_ignore_ascii_case("exit") {
            writeln!(out, "Leaving chat.")?;
            return Ok(());
        }

        if prompt.is_empty() {
            writeln!(out, "Please enter a question.")?;
            continue;
        }

        match chat.ask(prompt).await {
            Ok(answer) => {
                writeln!(out, "\n=== Answer ===")?;
                writeln!(out, "{}", answer.text)?;
                writeln!(out, "\n=== Token usage ===")?;
                writeln!(out, "Prompt tokens: {}", answer.usage.prompt_tokens)?;
                writeln!(out, "Response tokens: {}", answer.usage.response_tokens)?;
                writeln!(out, "Total tokens: {}", answer.usage.total_tokens)?;
            }
            Err(Error::Parse(raw)) => {
                writeln!(out, "Could not read the response:")?;
                writeln!(out, "{}", raw)?;
            }
            Err(e) => {
                writeln!(out, "Request failed: {}", e)?;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::MockChatClient;
    use pretty_assertions::assert_eq;
    use std::io::Cursor;

    fn finish(editor: &mut PromptEditor) -> Vec<String> {
        match editor.push_line("done") {
            EditorEvent::Finished(prompts) => prompts,
            other => panic!("expected Finished, got {:?}", other),
        }
    }

    #[test]
    fn test_editor_single_line_prompts_split_on_double_blank() {
        let mut editor = PromptEditor::new();

        assert_eq!(editor.push_line("a cat"), EditorEvent::Continue);
        assert_eq!(editor.push_line(""), EditorEvent::Continue);
        assert_eq!(editor.push_line(""), EditorEvent::Continue);
        assert_eq!(editor.push_line("a dog"), EditorEvent::Continue);

        assert_eq!(finish(&mut editor), vec!["a cat", "a dog"]);
    }

    #[test]
    fn test_editor_joins_multi_line_blocks_with_spaces() {
        let mut editor = PromptEditor::new();

        editor.push_line("a castle");
        editor.push_line("in the clouds");
        editor.push_line("");
        editor.push_line("at sunset");
        editor.push_line("");
        editor.push_line("");

        assert_eq!(
            finish(&mut editor),
            vec!["a castle in the clouds at sunset"]
        );
    }

    #[test]
    fn test_editor_done_flushes_unterminated_input() {
        let mut editor = PromptEditor::new();

        editor.push_line("a fox");

        assert_eq!(finish(&mut editor), vec!["a fox"]);
    }

    #[test]
    fn test_editor_quit_aborts_without_prompts() {
        let mut editor = PromptEditor::new();

        editor.push_line("a fox");
        assert_eq!(editor.push_line("QUIT"), EditorEvent::Aborted);
    }

    #[test]
    fn test_editor_ignores_leading_blank_lines() {
        let mut editor = PromptEditor::new();

        editor.push_line("");
        editor.push_line("");
        editor.push_line("a fox");
        editor.push_line("");
        editor.push_line("");

        assert_eq!(finish(&mut editor), vec!["a fox"]);
    }

    #[test]
    fn test_parse_image_count_clamps_and_defaults() {
        assert_eq!(parse_image_count("2"), 2);
        assert_eq!(parse_image_count("0"), 1);
        assert_eq!(parse_image_count("9"), 4);
        assert_eq!(parse_image_count("  3 "), 3);
        assert_eq!(parse_image_count("many"), 1);
        assert_eq!(parse_image_count("-1"), 1);
    }

    #[test]
    fn test_read_batch_request_happy_path() {
        let mut input = Cursor::new("a cat\n\n\na dog\n\ndone\ny\n2\n");
        let mut out = Vec::new();

        let request = read_batch_request(&mut input, &mut out).unwrap().unwrap();

        assert_eq!(request.prompts, vec!["a cat", "a dog"]);
        assert_eq!(request.images_per_prompt, 2);

        let shown = String::from_utf8(out).unwrap();
        assert!(shown.contains("Prompt 1:"));
        assert!(shown.contains("Prompt 2:"));
    }

    #[test]
    fn test_read_batch_request_rejection_reenters_entry() {
        let mut input = Cursor::new("a cat\ndone\nn\na dog\ndone\ny\n1\n");
        let mut out = Vec::new();

        let request = read_batch_request(&mut input, &mut out).unwrap().unwrap();

        assert_eq!(request.prompts, vec!["a dog"]);
        assert_eq!(request.images_per_prompt, 1);
    }

    #[test]
    fn test_read_batch_request_quit_returns_none() {
        let mut input = Cursor::new("quit\n");
        let mut out = Vec::new();

        assert!(read_batch_request(&mut input, &mut out).unwrap().is_none());
    }

    #[test]
    fn test_read_batch_request_empty_entry_reprompts() {
        let mut input = Cursor::new("done\na cat\ndone\ny\n1\n");
        let mut out = Vec::new();

        let request = read_batch_request(&mut input, &mut out).unwrap().unwrap();

        assert_eq!(request.prompts, vec!["a cat"]);
        let shown = String::from_utf8(out).unwrap();
        assert!(shown.contains("Please enter at least one prompt."));
    }

    #[tokio::test]
    async fn test_chat_loop_prints_answer_and_token_counts() {
        let chat = MockChatClient::new().with_answer("Rust is a systems language.");
        let mut input = Cursor::new("what is rust\nquit\n");
        let mut out = Vec::new();

        run_chat(&chat, &mut input, &mut out).await.unwrap();

        let shown = String::from_utf8(out).unwrap();
        assert!(shown.contains("Rust is a systems language."));
        assert!(shown.contains("Prompt tokens: 7"));
        assert!(shown.contains("Response tokens: 11"));
        assert!(shown.contains("Total tokens: 18"));
        assert_eq!(chat.get_call_count(), 1);
    }

    #[tokio::test]
    async fn test_chat_loop_reports_errors_and_continues() {
        let chat = MockChatClient::new()
            .with_api_error(500, "upstream down")
            .with_answer("recovered");
        let mut input = Cursor::new("first\nsecond\nexit\n");
        let mut out = Vec::new();

        run_chat(&chat, &mut input, &mut out).await.unwrap();

        let shown = String::from_utf8(out).unwrap();
        assert!(shown.contains("Request failed:"));
        assert!(shown.contains("recovered"));
        assert_eq!(chat.get_call_count(), 2);
    }

    #[tokio::test]
    async fn test_chat_loop_skips_blank_input() {
        let chat = MockChatClient::new();
        let mut input = Cursor::new("\n   \nexit\n");
        let mut out = Vec::new();

        run_chat(&chat, &mut input, &mut out).await.unwrap();

        assert_eq!(chat.get_call_count(), 0);
        let shown = String::from_utf8(out).unwrap();
        assert!(shown.contains("Please enter a question."));
    }
}
