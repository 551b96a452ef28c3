use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

pub type BookId = i64;
pub type TermId = i64;

/// The two label tables a book references exactly once each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Taxonomy {
    Kind,
    Genre,
}

impl Taxonomy {
    pub fn table(self) -> &'static str {
        match self {
            Taxonomy::Kind => "kinds",
            Taxonomy::Genre => "genres",
        }
    }
}

impl fmt::Display for Taxonomy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Taxonomy::Kind => "kind",
            Taxonomy::Genre => "genre",
        })
    }
}

/// Anything a caller can ask for by id and fail to find.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Entity {
    Book,
    Kind,
    Genre,
}

impl From<Taxonomy> for Entity {
    fn from(taxonomy: Taxonomy) -> Self {
        match taxonomy {
            Taxonomy::Kind => Entity::Kind,
            Taxonomy::Genre => Entity::Genre,
        }
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Entity::Book => "book",
            Entity::Kind => "kind",
            Entity::Genre => "genre",
        })
    }
}

/// A kind or genre row. Labels are stored trimmed and lower-cased.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Term {
    pub id: TermId,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    pub id: i64,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub id: BookId,
    pub name: String,
    pub author: String,
    pub price: Decimal,
    pub release_year: i32,
    pub kind: Term,
    pub genre: Term,
    /// Sorted, lower-cased, unique.
    pub keywords: Vec<String>,
    /// Ordered by image id.
    pub images: Vec<Image>,
}

/// A validated book ready to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBook {
    pub name: String,
    pub author: String,
    pub price: Decimal,
    pub release_year: i32,
    pub kind_id: TermId,
    pub genre_id: TermId,
    pub keywords: Vec<String>,
    pub image_urls: Vec<String>,
}

/// Validated partial update. `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookPatch {
    pub name: Option<String>,
    pub author: Option<String>,
    pub price: Option<Decimal>,
    pub release_year: Option<i32>,
    pub kind_id: Option<TermId>,
    pub genre_id: Option<TermId>,
    pub keywords: Option<Vec<String>>,
}

impl BookPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.author.is_none()
            && self.price.is_none()
            && self.release_year.is_none()
            && self.kind_id.is_none()
            && self.genre_id.is_none()
            && self.keywords.is_none()
    }
}
