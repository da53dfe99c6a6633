//! The in-memory article collection.
//!
//! One ordered `Vec` behind one `RwLock`. Every operation takes the lock once
//! and holds it for its whole scan-then-mutate sequence, so writers are
//! serialized and two concurrent creates can never pick the same id.

use thiserror::Error;
use tokio::sync::RwLock;

use crate::article::Article;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("article `{0}` not found")]
    NotFound(String),
}

/// What an [`ArticleStore::upsert`] did.
#[derive(Debug, PartialEq, Eq)]
pub enum Upsert {
    /// Appended, carrying the id that was assigned.
    Created(Article),
    /// Overwrote title, content and description of an existing record.
    Updated(Article),
}

impl Upsert {
    pub fn into_article(self) -> Article {
        match self {
            Self::Created(a) | Self::Updated(a) => a,
        }
    }
}

/// Owns the articles, in insertion order.
#[derive(Debug, Default)]
pub struct ArticleStore {
    articles: RwLock<Vec<Article>>,
}

impl ArticleStore {
    pub fn new(articles: Vec<Article>) -> Self {
        Self { articles: RwLock::new(articles) }
    }

    pub async fn len(&self) -> usize {
        self.articles.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.articles.read().await.is_empty()
    }

    /// Snapshot of every article, oldest first.
    pub async fn list(&self) -> Vec<Article> {
        self.articles.read().await.clone()
    }

    pub async fn get(&self, id: &str) -> Result<Article, StoreError> {
        self.articles.read().await
            .iter()
            .find(|a| a.id == id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_owned()))
    }

    /// Creates the article when its id is empty, otherwise overwrites the
    /// fields of the article with that id.
    ///
    /// An unknown non-empty id is an error; it never creates a record.
    pub async fn upsert(&self, mut article: Article) -> Result<Upsert, StoreError> {
        let mut articles = self.articles.write().await;

        if article.id.is_empty() {
            article.id = next_id(&articles);
            articles.push(article.clone());
            return Ok(Upsert::Created(article));
        }

        let existing = articles
            .iter_mut()
            .find(|a| a.id == article.id)
            .ok_or_else(|| StoreError::NotFound(article.id.clone()))?;
        existing.title.clone_from(&article.title);
        existing.content.clone_from(&article.content);
        existing.description.clone_from(&article.description);
        Ok(Upsert::Updated(article))
    }

    /// Removes the article with `id`, keeping the rest in order.
    pub async fn delete(&self, id: &str) -> Result<Article, StoreError> {
        let mut articles = self.articles.write().await;
        let index = articles
            .iter()
            .position(|a| a.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_owned()))?;
        Ok(articles.remove(index))
    }
}

/// `len + 1`, bumped past any id a deletion left behind.
fn next_id(articles: &[Article]) -> String {
    let mut n = articles.len() + 1;
    loop {
        let id = n.to_string();
        if !articles.iter().any(|a| a.id == id) {
            return id;
        }
        n += 1;
    }
}
