use crate::auth::AuthUser;
use crate::errors::AppError;
use bookstore_types::domain::book::{Book, BookSort, NewBook};
use bookstore_types::domain::page::Page;
use bookstore_types::ports::{BookFilter, Store};

pub struct BookService<R: Store> {
    repo: R,
}

impl<R: Store> BookService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub async fn create_book(
        &self,
        owner: &AuthUser,
        title: String,
        author: String,
        description: String,
        price_cents: i64,
        genres: Vec<String>,
    ) -> Result<Book, AppError> {
        let book = NewBook::new(title, author, description, price_cents, genres, Some(owner.id))
            .map_err(|e| AppError::BadRequest(e.to_string()))?;
        let created = self.repo.create_book(book).await?;
        tracing::info!(book_id = created.id, owner_id = owner.id, "book listed");
        Ok(created)
    }

    pub async fn get_book(&self, id: i64) -> Result<Book, AppError> {
        self.repo
            .get_book(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("book {}", id)))
    }

    pub async fn list_books(&self) -> Result<Vec<Book>, AppError> {
        Ok(self.repo.list_books(BookSort::Id).await?)
    }

    /// Only the listing user may remove an owned book.
    pub async fn delete_book(&self, caller: &AuthUser, id: i64) -> Result<(), AppError> {
        let book = self.get_book(id).await?;
        if book.owner_id.is_some() && !book.is_owned_by(caller.id) {
            return Err(AppError::Forbidden(format!(
                "book {} belongs to another user",
                id
            )));
        }
        if !self.repo.delete_book(id).await? {
            return Err(AppError::NotFound(format!("book {}", id)));
        }
        tracing::info!(book_id = id, "book deleted");
        Ok(())
    }

    pub async fn books_by_genre(&self, genre: &str) -> Result<Vec<Book>, AppError> {
        Ok(self
            .repo
            .search_books(BookFilter::Genre(genre.to_string()))
            .await?)
    }

    pub async fn search_by_title(&self, title: &str) -> Result<Vec<Book>, AppError> {
        Ok(self
            .repo
            .search_books(BookFilter::TitleContains(title.to_string()))
            .await?)
    }

    pub async fn search_by_author(&self, author: &str) -> Result<Vec<Book>, AppError> {
        Ok(self
            .repo
            .search_books(BookFilter::AuthorContains(author.to_string()))
            .await?)
    }

    pub async fn books_in_price_range(
        &self,
        min_cents: i64,
        max_cents: i64,
    ) -> Result<Vec<Book>, AppError> {
        if min_cents > max_cents {
            return Err(AppError::BadRequest(
                "min price must not exceed max price".into(),
            ));
        }
        Ok(self
            .repo
            .search_books(BookFilter::PriceBetween {
                min_cents,
                max_cents,
            })
            .await?)
    }

    pub async fn sorted_books(&self, sort_by: &str) -> Result<Vec<Book>, AppError> {
        let sort: BookSort = sort_by
            .parse()
            .map_err(|e: anyhow::Error| AppError::BadRequest(e.to_string()))?;
        Ok(self.repo.list_books(sort).await?)
    }

    pub async fn paginated_books(&self, page: u32, size: u32) -> Result<Page<Book>, AppError> {
        if size == 0 {
            return Err(AppError::BadRequest("page size must be positive".into()));
        }
        let (content, total) = self.repo.page_books(page, size).await?;
        Ok(Page::new(content, page, size, total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bookstore_repo::memory::InMemoryRepo;

    fn caller(id: i64) -> AuthUser {
        AuthUser {
            id,
            username: format!("user{id}"),
        }
    }

    async fn seeded() -> BookService<InMemoryRepo> {
        let svc = BookService::new(InMemoryRepo::new());
        let owner = caller(1);
        for (title, author, price, genre) in [
            ("Dune", "Frank Herbert", 1500, "Sci-Fi"),
            ("Emma", "Jane Austen", 900, "Romance"),
            ("Persuasion", "Jane Austen", 1100, "Romance"),
        ] {
            svc.create_book(
                &owner,
                title.into(),
                author.into(),
                String::new(),
                price,
                vec![genre.into()],
            )
            .await
            .unwrap();
        }
        svc
    }

    #[tokio::test]
    async fn queries() {
        let svc = seeded().await;
        assert_eq!(svc.books_by_genre("romance").await.unwrap().len(), 2);
        assert_eq!(svc.search_by_author("austen").await.unwrap().len(), 2);
        assert_eq!(svc.search_by_title("UNE").await.unwrap()[0].title, "Dune");
        assert_eq!(svc.books_in_price_range(1000, 2000).await.unwrap().len(), 2);

        let sorted = svc.sorted_books("title").await.unwrap();
        let titles: Vec<_> = sorted.iter().map(|b| b.title.as_str()).collect();
        assert_eq!(titles, vec!["Dune", "Emma", "Persuasion"]);

        let page = svc.paginated_books(0, 2).await.unwrap();
        assert_eq!(page.content.len(), 2);
        assert_eq!(page.total_pages, 2);
    }

    #[tokio::test]
    async fn invalid_inputs_are_bad_requests() {
        let svc = seeded().await;
        assert!(matches!(
            svc.books_in_price_range(10, 1).await,
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(svc.sorted_books("isbn").await, Err(AppError::BadRequest(_))));
        assert!(matches!(svc.paginated_books(0, 0).await, Err(AppError::BadRequest(_))));
        let bad = svc
            .create_book(&caller(1), "".into(), "A".into(), String::new(), 1, vec![])
            .await;
        assert!(matches!(bad, Err(AppError::BadRequest(_))));
        let priceless = svc
            .create_book(&caller(1), "T".into(), "A".into(), String::new(), i64::MAX, vec![])
            .await;
        assert!(matches!(priceless, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn only_owner_deletes() {
        let svc = seeded().await;
        assert!(matches!(svc.delete_book(&caller(2), 1).await, Err(AppError::Forbidden(_))));
        svc.delete_book(&caller(1), 1).await.unwrap();
        assert!(matches!(svc.get_book(1).await, Err(AppError::NotFound(_))));
        assert!(matches!(svc.delete_book(&caller(1), 1).await, Err(AppError::NotFound(_))));
    }
}
