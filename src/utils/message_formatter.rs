/// telegram rejects messages longer than 4096 UTF-16 code units
pub const MAX_MESSAGE_LENGTH: usize = 4096;

pub struct MessageFormatter;

impl MessageFormatter {
    pub fn escape_html(text: &str) -> String {
        html_escape::encode_text(text).to_string()
    }

    /// counts UTF-16 code units as Telegram does for message length limits
    pub fn count_utf16_code_units(text: &str) -> usize {
        text.encode_utf16().count()
    }

    /// appends lines to `header` one by one and stops before the message would
    /// exceed `max_length`; returns the text and how many lines made it in
    pub fn append_lines_within_limit(
        header: &str,
        lines: &[String],
        max_length: usize,
    ) -> (String, usize) {
        let mut text = header.to_string();
        let mut length = Self::count_utf16_code_units(&text);
        let mut taken = 0;

        for line in lines {
            let line_length = Self::count_utf16_code_units(line) + 1;
            if length + line_length > max_length {
                break;
            }
            text.push('\n');
            text.push_str(line);
            length += line_length;
            taken += 1;
        }

        (text, taken)
    }
}
