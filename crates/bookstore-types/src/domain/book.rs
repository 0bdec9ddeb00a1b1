use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A catalogue entry. `number_of_reviews` and `average_rating` are derived from
/// approved reviews whenever the book is read.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub author: String,
    #[serde(default)]
    pub description: String,
    pub price_cents: i64,
    #[serde(default)]
    pub genres: Vec<String>,
    pub owner_id: Option<i64>,
    #[serde(default)]
    pub number_of_reviews: u32,
    #[serde(default)]
    pub average_rating: f64,
}

impl Book {
    pub fn has_genre(&self, genre: &str) -> bool {
        self.genres.iter().any(|g| g.eq_ignore_ascii_case(genre))
    }

    pub fn is_owned_by(&self, user_id: i64) -> bool {
        self.owner_id == Some(user_id)
    }

    pub fn apply_metrics(&mut self, approved_ratings: &[u8]) {
        self.number_of_reviews = approved_ratings.len() as u32;
        self.average_rating = if approved_ratings.is_empty() {
            0.0
        } else {
            approved_ratings.iter().map(|r| *r as f64).sum::<f64>() / approved_ratings.len() as f64
        };
    }
}

/// Highest accepted unit price (ten million dollars).
pub const MAX_PRICE_CENTS: i64 = 1_000_000_000;

#[derive(Debug, Clone)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub description: String,
    pub price_cents: i64,
    pub genres: Vec<String>,
    pub owner_id: Option<i64>,
}

impl NewBook {
    pub fn new(
        title: String,
        author: String,
        description: String,
        price_cents: i64,
        genres: Vec<String>,
        owner_id: Option<i64>,
    ) -> anyhow::Result<Self> {
        if title.trim().is_empty() {
            anyhow::bail!("title must not be empty");
        }
        if author.trim().is_empty() {
            anyhow::bail!("author must not be empty");
        }
        if price_cents < 0 {
            anyhow::bail!("price must not be negative");
        }
        if price_cents > MAX_PRICE_CENTS {
            anyhow::bail!("price must not exceed {MAX_PRICE_CENTS} cents");
        }
        let genres = genres
            .into_iter()
            .map(|g| g.trim().to_string())
            .filter(|g| !g.is_empty())
            .collect();
        Ok(Self {
            title,
            author,
            description,
            price_cents,
            genres,
            owner_id,
        })
    }

    pub fn into_book(self, id: i64) -> Book {
        Book {
            id,
            title: self.title,
            author: self.author,
            description: self.description,
            price_cents: self.price_cents,
            genres: self.genres,
            owner_id: self.owner_id,
            number_of_reviews: 0,
            average_rating: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BookSort {
    #[default]
    Id,
    Title,
    Author,
    Price,
}

impl BookSort {
    pub fn column(&self) -> &'static str {
        match self {
            BookSort::Id => "id",
            BookSort::Title => "title",
            BookSort::Author => "author",
            BookSort::Price => "price_cents",
        }
    }

    pub fn sort(&self, books: &mut [Book]) {
        match self {
            BookSort::Id => books.sort_by_key(|b| b.id),
            BookSort::Title => books.sort_by(|a, b| a.title.cmp(&b.title).then(a.id.cmp(&b.id))),
            BookSort::Author => books.sort_by(|a, b| a.author.cmp(&b.author).then(a.id.cmp(&b.id))),
            BookSort::Price => books.sort_by_key(|b| (b.price_cents, b.id)),
        }
    }
}

impl FromStr for BookSort {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "id" => Ok(BookSort::Id),
            "title" => Ok(BookSort::Title),
            "author" => Ok(BookSort::Author),
            "price" | "price_cents" => Ok(BookSort::Price),
            other => anyhow::bail!("unsupported sort field: {other}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book(id: i64, title: &str, author: &str, price: i64) -> Book {
        NewBook::new(title.into(), author.into(), String::new(), price, vec![], None)
            .unwrap()
            .into_book(id)
    }

    #[test]
    fn new_book_validation() {
        assert!(NewBook::new("".into(), "A".into(), "".into(), 1, vec![], None).is_err());
        assert!(NewBook::new("T".into(), " ".into(), "".into(), 1, vec![], None).is_err());
        assert!(NewBook::new("T".into(), "A".into(), "".into(), -1, vec![], None).is_err());
        assert!(NewBook::new("T".into(), "A".into(), "".into(), i64::MAX, vec![], None).is_err());
        assert!(
            NewBook::new("T".into(), "A".into(), "".into(), MAX_PRICE_CENTS, vec![], None).is_ok()
        );
        let ok = NewBook::new(
            "T".into(),
            "A".into(),
            "".into(),
            0,
            vec![" Fiction ".into(), "".into()],
            Some(3),
        )
        .unwrap();
        assert_eq!(ok.genres, vec!["Fiction".to_string()]);
    }

    #[test]
    fn metrics_average_approved_ratings() {
        let mut b = book(1, "T", "A", 100);
        b.apply_metrics(&[5, 4, 3]);
        assert_eq!(b.number_of_reviews, 3);
        assert!((b.average_rating - 4.0).abs() < f64::EPSILON);
        b.apply_metrics(&[]);
        assert_eq!(b.number_of_reviews, 0);
        assert_eq!(b.average_rating, 0.0);
    }

    #[test]
    fn sort_keys_parse_and_order() {
        assert_eq!("Price".parse::<BookSort>().unwrap(), BookSort::Price);
        assert!("publisher".parse::<BookSort>().is_err());

        let mut books = vec![book(1, "Book B", "Author Y", 300), book(2, "Book A", "Author X", 100)];
        BookSort::Author.sort(&mut books);
        assert_eq!(books[0].author, "Author X");
        BookSort::Id.sort(&mut books);
        assert_eq!(books[0].id, 1);
    }

    #[test]
    fn genre_match_ignores_case() {
        let mut b = book(1, "T", "A", 1);
        b.genres = vec!["Fiction".into()];
        assert!(b.has_genre("fiction"));
        assert!(!b.has_genre("fict"));
    }
}
