//! Like/favorite toggle planning
//!
//! Deciding what a toggle does to the interaction row and the article
//! counter is kept free of I/O so it can be checked without a database.
//! [`crate::repositories::InteractionRepository::toggle`] executes the plan
//! inside a transaction that holds the article row lock.

use thiserror::Error;

/// Which flag a toggle targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionKind {
    Like,
    Favorite,
}

impl InteractionKind {
    /// Article counter tracking this flag
    pub fn counter_column(self) -> &'static str {
        match self {
            InteractionKind::Like => "like_count",
            InteractionKind::Favorite => "collect_count",
        }
    }

    fn past_tense(self) -> &'static str {
        match self {
            InteractionKind::Like => "liked",
            InteractionKind::Favorite => "favorited",
        }
    }

    /// Parse the wire action word for this kind
    pub fn parse_action(self, word: &str) -> Result<InteractionAction, String> {
        match (self, word) {
            (InteractionKind::Like, "like") | (InteractionKind::Favorite, "favorite") => {
                Ok(InteractionAction::Apply)
            }
            (InteractionKind::Like, "unlike") | (InteractionKind::Favorite, "unfavorite") => {
                Ok(InteractionAction::Revoke)
            }
            (InteractionKind::Like, _) => Err("Action must be 'like' or 'unlike'".to_string()),
            (InteractionKind::Favorite, _) => {
                Err("Action must be 'favorite' or 'unfavorite'".to_string())
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionAction {
    Apply,
    Revoke,
}

/// Flags of one (article, user) interaction row
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InteractionFlags {
    pub is_like: bool,
    pub is_collect: bool,
    pub has_comment: bool,
}

impl InteractionFlags {
    fn get(&self, kind: InteractionKind) -> bool {
        match kind {
            InteractionKind::Like => self.is_like,
            InteractionKind::Favorite => self.is_collect,
        }
    }

    fn with(mut self, kind: InteractionKind, value: bool) -> Self {
        match kind {
            InteractionKind::Like => self.is_like = value,
            InteractionKind::Favorite => self.is_collect = value,
        }
        self
    }

    /// A row may only exist while this holds
    pub fn any_active(&self) -> bool {
        self.is_like || self.is_collect || self.has_comment
    }
}

/// What happens to the interaction row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowMutation {
    Insert(InteractionFlags),
    Update(InteractionFlags),
    Delete,
}

/// What happens to the article counter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterDelta {
    Increment,
    /// Floors at zero
    Decrement,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TogglePlan {
    pub mutation: RowMutation,
    pub delta: CounterDelta,
    /// Flag state once the plan is applied
    pub active: bool,
}

/// Result of an executed toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToggleOutcome {
    pub count: i64,
    pub active: bool,
}

#[derive(Error, Debug)]
pub enum InteractionError {
    #[error("Article not found")]
    ArticleNotFound,

    #[error("Article already {}", .0.past_tense())]
    AlreadyDone(InteractionKind),

    #[error("Article not {} yet", .0.past_tense())]
    NotDone(InteractionKind),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Decide the row mutation and counter change for a toggle
pub fn plan_toggle(
    existing: Option<InteractionFlags>,
    kind: InteractionKind,
    action: InteractionAction,
) -> Result<TogglePlan, InteractionError> {
    match action {
        InteractionAction::Apply => {
            let mutation = match existing {
                None => RowMutation::Insert(InteractionFlags::default().with(kind, true)),
                Some(flags) if flags.get(kind) => return Err(InteractionError::AlreadyDone(kind)),
                Some(flags) => RowMutation::Update(flags.with(kind, true)),
            };

            Ok(TogglePlan {
                mutation,
                delta: CounterDelta::Increment,
                active: true,
            })
        }
        InteractionAction::Revoke => {
            let flags = match existing {
                Some(flags) if flags.get(kind) => flags,
                _ => return Err(InteractionError::NotDone(kind)),
            };

            let remaining = flags.with(kind, false);
            let mutation = if remaining.any_active() {
                RowMutation::Update(remaining)
            } else {
                RowMutation::Delete
            };

            Ok(TogglePlan {
                mutation,
                delta: CounterDelta::Decrement,
                active: false,
            })
        }
    }
}
