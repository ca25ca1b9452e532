use crate::driver::Engine;

/// Placeholder style for bound parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    /// `?`
    Question,
    /// `$1`, `$2`, ...
    Dollar,
    /// `:1`, `:2`, ...
    Colon,
}

/// Engine specific SQL spelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dialect {
    pub placeholder: Placeholder,
    pub identifier_quote: char,
}

impl Dialect {
    pub const fn for_engine(engine: Engine) -> Self {
        match engine {
            Engine::MySql => Self {
                placeholder: Placeholder::Question,
                identifier_quote: '`',
            },
            Engine::PostgreSql => Self {
                placeholder: Placeholder::Dollar,
                identifier_quote: '"',
            },
            Engine::Oracle => Self {
                placeholder: Placeholder::Colon,
                identifier_quote: '"',
            },
            Engine::Sqlite | Engine::Odbc => Self {
                placeholder: Placeholder::Question,
                identifier_quote: '"',
            },
        }
    }

    /// Quotes an identifier, doubling any embedded quote character.
    pub fn quote_identifier(&self, ident: &str) -> String {
        let q = self.identifier_quote;
        let mut quoted = String::with_capacity(ident.len() + 2);
        quoted.push(q);
        for c in ident.chars() {
            if c == q {
                quoted.push(q);
            }
            quoted.push(c);
        }
        quoted.push(q);
        quoted
    }

    /// Placeholder for the parameter at 1-based position `n`.
    pub fn placeholder(&self, n: usize) -> String {
        match self.placeholder {
            Placeholder::Question => "?".to_string(),
            Placeholder::Dollar => format!("${n}"),
            Placeholder::Colon => format!(":{n}"),
        }
    }
}
