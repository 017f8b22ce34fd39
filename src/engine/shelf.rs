//! Shelf assembly - a short list built around one personalized pick
//!
//! The pick is followed by catalog books that share a category or the
//! author with it, then topped up with the most borrowed books.

use serde::Serialize;

use super::recommender::Recommender;
use crate::catalog::{BookFeature, BookId, UserId};

/// Ordered list of books for display
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Shelf {
    pub books: Vec<BookId>,
    /// Whether the list starts with a personalized pick
    pub personalized: bool,
}

impl Recommender {
    /// Up to `size` books for a user; anonymous callers get popular books
    pub fn recommend_shelf(&self, user: Option<&UserId>, size: usize) -> Shelf {
        if size == 0 {
            return Shelf {
                books: Vec::new(),
                personalized: false,
            };
        }

        let pick = user.and_then(|u| self.recommend_one(u));
        let mut books: Vec<BookId> = Vec::with_capacity(size);

        if let Some(pick) = &pick {
            books.push(pick.clone());
            if let Some(anchor) = self.catalog().get(pick) {
                let related = self
                    .catalog()
                    .iter()
                    .filter(|b| &b.id != pick && is_related(anchor, b))
                    .map(|b| b.id.clone())
                    .take(size - 1);
                books.extend(related);
            }
        }

        if books.len() < size {
            for (book, _) in self.popular(size + books.len()) {
                if books.len() >= size {
                    break;
                }
                if !books.contains(&book) {
                    books.push(book);
                }
            }
        }

        Shelf {
            books,
            personalized: pick.is_some(),
        }
    }
}

fn is_related(anchor: &BookFeature, other: &BookFeature) -> bool {
    let shared = |a: &Option<String>, b: &Option<String>| matches!((a, b), (Some(x), Some(y)) if x == y);
    shared(&anchor.category1, &other.category1)
        || shared(&anchor.category2, &other.category2)
        || shared(&anchor.author, &other.author)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book(id: &str, author: &str, c1: Option<&str>) -> BookFeature {
        BookFeature {
            id: BookId::new(id),
            title: id.to_string(),
            author: Some(author.to_string()),
            publisher: None,
            category1: c1.map(str::to_string),
            category2: None,
        }
    }

    #[test]
    fn test_related_requires_present_equal_values() {
        let a = book("1", "X", None);
        let b = book("2", "Y", None);
        let c = book("3", "Y", Some("Poetry"));
        let d = book("4", "Z", Some("Poetry"));

        assert!(!is_related(&a, &b));
        assert!(is_related(&b, &c));
        assert!(is_related(&c, &d));
    }
}
