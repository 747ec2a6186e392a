use html5ever::tendril::StrTendril;
use html5ever::tokenizer::states::RawKind;
use html5ever::tokenizer::{
    BufferQueue, Tag, TagKind, Token as HtmlToken, TokenSink, TokenSinkResult, Tokenizer,
    TokenizerOpts,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Element start, lowercase tag name plus decoded attribute pairs
    Start {
        name: String,
        attrs: Vec<(String, String)>,
    },
    End {
        name: String,
    },
    /// Character data with entities decoded
    Text(String),
}

/// Split markup into start tags, end tags and text in a single forward pass.
///
/// Only the html5ever tokenizer runs here, never the tree builder, so tags
/// come out exactly as written: nothing is closed, reopened or moved. Never
/// fails; anything that is not a tag, comment or doctype is text. A
/// self-closing tag such as `<b/>` yields a start followed by an end.
pub fn tokenize(html: &str) -> Vec<Token> {
    // The tokenizer rewrites \r and \r\n to \n. A form feed is whitespace
    // inside tags just like \r, so it stands in for \r while tokenizing.
    let swap_carriage_returns = html.contains('\r') && !html.contains('\x0C');
    let input = if swap_carriage_returns {
        html.replace('\r', "\x0C")
    } else {
        html.to_string()
    };

    let mut queue = BufferQueue::default();
    queue.push_back(StrTendril::from(input.as_str()));

    let mut tokenizer = Tokenizer::new(TokenCollector::default(), TokenizerOpts::default());
    let _ = tokenizer.feed(&mut queue);
    tokenizer.end();

    let mut tokens = tokenizer.sink.tokens;
    if swap_carriage_returns {
        restore_carriage_returns(&mut tokens);
    }
    tokens
}

fn restore_carriage_returns(tokens: &mut [Token]) {
    for token in tokens {
        match token {
            Token::Text(text) => *text = text.replace('\x0C', "\r"),
            Token::Start { attrs, .. } => {
                for (_, value) in attrs.iter_mut() {
                    *value = value.replace('\x0C', "\r");
                }
            }
            Token::End { .. } => {}
        }
    }
}

#[derive(Default)]
struct TokenCollector {
    tokens: Vec<Token>,
}

impl TokenCollector {
    fn tag(&mut self, tag: Tag) -> TokenSinkResult<()> {
        let name = tag.name.to_string();

        if tag.kind == TagKind::EndTag {
            self.tokens.push(Token::End { name });
            return TokenSinkResult::Continue;
        }

        let attrs = tag
            .attrs
            .iter()
            .map(|attr| (attr.name.local.to_string(), attr.value.to_string()))
            .collect();
        self.tokens.push(Token::Start {
            name: name.clone(),
            attrs,
        });

        if tag.self_closing {
            self.tokens.push(Token::End { name });
            return TokenSinkResult::Continue;
        }

        // script and style bodies are raw text up to their end tag
        match name.as_str() {
            "script" => TokenSinkResult::RawData(RawKind::ScriptData),
            "style" => TokenSinkResult::RawData(RawKind::Rawtext),
            _ => TokenSinkResult::Continue,
        }
    }

    fn text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }

        // Merge with a directly preceding text run
        if let Some(Token::Text(previous)) = self.tokens.last_mut() {
            previous.push_str(text);
        } else {
            self.tokens.push(Token::Text(text.to_string()));
        }
    }
}

impl TokenSink for TokenCollector {
    type Handle = ();

    fn process_token(&mut self, token: HtmlToken, _line_number: u64) -> TokenSinkResult<()> {
        match token {
            HtmlToken::TagToken(tag) => return self.tag(tag),
            HtmlToken::CharacterTokens(text) => self.text(&text),
            HtmlToken::NullCharacterToken => self.text("\0"),
            // Comments, doctypes and parse errors carry no content
            HtmlToken::CommentToken(_)
            | HtmlToken::DoctypeToken(_)
            | HtmlToken::ParseError(_)
            | HtmlToken::EOFToken => {}
        }
        TokenSinkResult::Continue
    }
}
