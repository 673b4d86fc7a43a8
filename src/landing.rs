/// Quotes for the fresh-start landing page
use log::warn;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Quote {
    pub text: &'static str,
    pub author: &'static str,
}

pub const QUOTES: [Quote; 7] = [
    Quote {
        text: "You don't have to be who you were 10 tabs ago.",
        author: "Timeline Compliance",
    },
    Quote {
        text: "Start where you are. Use what you have. Do what you can.",
        author: "Arthur Ashe",
    },
    Quote {
        text: "The best time for a fresh start is now.",
        author: "Corporate Timekeeping",
    },
    Quote {
        text: "Small steps. Clean slate. Same you.",
        author: "Internal Memo #42",
    },
    Quote {
        text: "Progress, not perfection.",
        author: "Unreasonably Effective Humans",
    },
    Quote {
        text: "You are one good decision away from a better afternoon.",
        author: "Calendar Invite",
    },
    Quote {
        text: "Today is a great day to reduce complexity.",
        author: "Systems Thinking",
    },
];

pub fn quote_at(seed: u32) -> Quote {
    QUOTES[seed as usize % QUOTES.len()]
}

pub fn random_quote() -> Quote {
    let mut seed = [0u8; 4];
    match getrandom::getrandom(&mut seed) {
        Ok(()) => quote_at(u32::from_le_bytes(seed)),
        Err(e) => {
            warn!("No randomness available, using the first quote: {}", e);
            QUOTES[0]
        }
    }
}
