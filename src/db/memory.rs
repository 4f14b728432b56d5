//! In-process paper store
//!
//! Backs dev mode (`database.url = "memory"`) and tests. Mirrors the
//! Repository semantics: server-assigned ids and timestamps, newest-first
//! listings, conditional delete.

use super::{NewPaper, Paper, PaperStore};
use crate::errors::Result;
use async_trait::async_trait;
use chrono::Utc;
use std::cmp::Reverse;
use std::sync::Mutex;
use uuid::Uuid;

#[derive(Default)]
pub struct MemoryPaperStore {
    papers: Mutex<Vec<Paper>>,
}

impl MemoryPaperStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PaperStore for MemoryPaperStore {
    async fn insert(&self, new: NewPaper) -> Result<Paper> {
        let paper = Paper {
            id: Uuid::new_v4(),
            user_id: new.user_id,
            title: new.title,
            authors: new.authors,
            abstract_text: new.abstract_text,
            tags: new.tags,
            file_url: new.file_url,
            external_id: new.external_id,
            file_path: new.file_path,
            extracted_text: new.extracted_text,
            content_hash: new.content_hash,
            created_at: Utc::now(),
        };
        self.papers.lock().unwrap().push(paper.clone());
        Ok(paper)
    }

    async fn list_by_user(&self, user_id: &str) -> Result<Vec<Paper>> {
        let mut papers: Vec<Paper> = self
            .papers
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect();
        papers.sort_by_key(|p| Reverse(p.created_at));
        Ok(papers)
    }

    async fn find_by_id(&self, user_id: &str, id: Uuid) -> Result<Option<Paper>> {
        Ok(self
            .papers
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == id && p.user_id == user_id)
            .cloned())
    }

    async fn search_by_title(&self, user_id: &str, title: &str) -> Result<Vec<Paper>> {
        let mut papers: Vec<Paper> = self
            .papers
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.user_id == user_id && p.title == title)
            .cloned()
            .collect();
        papers.sort_by_key(|p| Reverse(p.created_at));
        Ok(papers)
    }

    async fn delete_by_id(&self, user_id: &str, id: Uuid) -> Result<bool> {
        let mut papers = self.papers.lock().unwrap();
        let before = papers.len();
        papers.retain(|p| !(p.id == id && p.user_id == user_id));
        Ok(papers.len() < before)
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_paper(user: &str, title: &str) -> NewPaper {
        NewPaper {
            user_id: user.to_string(),
            title: title.to_string(),
            authors: vec!["A".to_string()],
            abstract_text: "about".to_string(),
            tags: vec!["t1".into(), "t2".into(), "t3".into()],
            file_url: String::new(),
            external_id: "p1".to_string(),
            file_path: "abc.pdf".to_string(),
            extracted_text: "text".to_string(),
            content_hash: "abc".to_string(),
        }
    }

    #[tokio::test]
    async fn test_insert_assigns_distinct_ids() {
        let store = MemoryPaperStore::new();
        let a = store.insert(new_paper("u", "X")).await.unwrap();
        let b = store.insert(new_paper("u", "X")).await.unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(store.list_by_user("u").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_listing_is_scoped_to_user() {
        let store = MemoryPaperStore::new();
        store.insert(new_paper("alice", "X")).await.unwrap();
        store.insert(new_paper("bob", "Y")).await.unwrap();
        assert_eq!(store.list_by_user("alice").await.unwrap().len(), 1);
        assert!(store.list_by_user("nobody").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_title_search_returns_all_matches() {
        let store = MemoryPaperStore::new();
        store.insert(new_paper("u", "X")).await.unwrap();
        store.insert(new_paper("u", "X")).await.unwrap();
        store.insert(new_paper("u", "Y")).await.unwrap();
        assert_eq!(store.search_by_title("u", "X").await.unwrap().len(), 2);
        assert!(store.search_by_title("u", "Z").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_conditional_delete_reports_removal() {
        let store = MemoryPaperStore::new();
        let paper = store.insert(new_paper("u", "X")).await.unwrap();
        assert!(!store.delete_by_id("u", Uuid::new_v4()).await.unwrap());
        assert!(!store.delete_by_id("other", paper.id).await.unwrap());
        assert!(store.delete_by_id("u", paper.id).await.unwrap());
        assert!(store.find_by_id("u", paper.id).await.unwrap().is_none());
    }
}
