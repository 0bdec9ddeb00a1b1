use crate::auth::AuthUser;
use crate::errors::AppError;
use bookstore_types::domain::book::Book;
use bookstore_types::domain::page::Page;
use bookstore_types::domain::review::{NewReview, Review, ReviewSort};
use bookstore_types::ports::Store;

pub struct ReviewService<R: Store> {
    repo: R,
}

impl<R: Store> ReviewService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    async fn book(&self, book_id: i64) -> Result<Book, AppError> {
        self.repo
            .get_book(book_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("book {}", book_id)))
    }

    /// Loads a review and checks it is attached to `book_id`.
    async fn review_of(&self, book_id: i64, review_id: i64) -> Result<Review, AppError> {
        let review = self
            .repo
            .get_review(review_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("review {}", review_id)))?;
        if review.book_id != book_id {
            return Err(AppError::BadRequest(format!(
                "review {} does not belong to book {}",
                review_id, book_id
            )));
        }
        Ok(review)
    }

    pub async fn add_review(
        &self,
        caller: &AuthUser,
        book_id: i64,
        rating: i64,
        comment: String,
    ) -> Result<Review, AppError> {
        self.book(book_id).await?;
        let review = NewReview::new(book_id, caller.id, rating, comment)
            .map_err(|e| AppError::BadRequest(e.to_string()))?;
        let created = self.repo.create_review(review).await?;
        tracing::info!(review_id = created.id, book_id, user_id = caller.id, "review submitted");
        Ok(created)
    }

    pub async fn list_reviews(
        &self,
        caller: &AuthUser,
        book_id: i64,
        page: u32,
        size: u32,
        sort: ReviewSort,
    ) -> Result<Page<Review>, AppError> {
        if size == 0 {
            return Err(AppError::BadRequest("page size must be positive".into()));
        }
        let book = self.book(book_id).await?;
        let mut visible: Vec<Review> = self
            .repo
            .reviews_for_book(book_id)
            .await?
            .into_iter()
            .filter(|r| r.visible_to(caller.id, book.owner_id))
            .collect();
        sort.sort(&mut visible);
        Ok(Page::from_vec(visible, page, size))
    }

    pub async fn approve_review(
        &self,
        caller: &AuthUser,
        book_id: i64,
        review_id: i64,
    ) -> Result<Review, AppError> {
        let book = self.book(book_id).await?;
        self.review_of(book_id, review_id).await?;
        if !book.is_owned_by(caller.id) {
            return Err(AppError::Forbidden(
                "only the book's owner can approve reviews".into(),
            ));
        }
        let approved = self
            .repo
            .approve_review(review_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("review {}", review_id)))?;
        tracing::info!(review_id, book_id, "review approved");
        Ok(approved)
    }

    pub async fn delete_review(
        &self,
        caller: &AuthUser,
        book_id: i64,
        review_id: i64,
    ) -> Result<(), AppError> {
        let book = self.book(book_id).await?;
        let review = self.review_of(book_id, review_id).await?;
        if review.user_id != caller.id && !book.is_owned_by(caller.id) {
            return Err(AppError::Forbidden(
                "only the reviewer or the book's owner can delete this review".into(),
            ));
        }
        if !self.repo.delete_review(review_id).await? {
            return Err(AppError::NotFound(format!("review {}", review_id)));
        }
        Ok(())
    }
}
