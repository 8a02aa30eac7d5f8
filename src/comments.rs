use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

/// Review lifecycle of a comment thread
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommentStatus {
    Open,
    Resolved,
    Archived,
}

impl CommentStatus {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            CommentStatus::Open => "open",
            CommentStatus::Resolved => "resolved",
            CommentStatus::Archived => "archived",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reply {
    pub id: String,
    pub content: String,
    pub author: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub likes: BTreeSet<String>,
}

impl Reply {
    #[must_use]
    pub fn new(content: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            content: content.into(),
            author: author.into(),
            created_at: Utc::now(),
            likes: BTreeSet::new(),
        }
    }
}

/// A positioned comment thread on one page.
///
/// `x`/`y` are page coordinates at 100% zoom; the presentation layer scales
/// them by the current zoom factor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub content: String,
    pub author: String,
    /// Page number (1-indexed)
    pub page: usize,
    pub x: f32,
    pub y: f32,
    pub status: CommentStatus,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub replies: Vec<Reply>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub likes: BTreeSet<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Comment {
    #[must_use]
    pub fn new(
        page: usize,
        x: f32,
        y: f32,
        content: impl Into<String>,
        author: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            content: content.into(),
            author: author.into(),
            page,
            x,
            y,
            status: CommentStatus::Open,
            replies: Vec::new(),
            likes: BTreeSet::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

fn toggle(likes: &mut BTreeSet<String>, user: &str) -> bool {
    if likes.remove(user) {
        false
    } else {
        likes.insert(user.to_string());
        true
    }
}

/// Persistent comment store for one document
pub struct CommentStore {
    pub file_path: PathBuf,
    comments: Vec<Comment>,
    // page -> comment indices
    by_page: HashMap<usize, Vec<usize>>,
}

impl CommentStore {
    /// Open (or create) the store for a document id.
    ///
    /// With no explicit directory the store lives under the platform data
    /// dir, overridable through `GLOSSA_DATA_DIR`.
    pub fn open(document_id: &str, comments_dir: Option<&Path>) -> Result<Self> {
        let resolved_dir = match comments_dir {
            Some(dir) => dir.to_path_buf(),
            None => Self::default_dir()?,
        };

        if !resolved_dir.exists() {
            fs::create_dir_all(&resolved_dir)
                .with_context(|| format!("Failed to create comments directory: {resolved_dir:?}"))?;
        }

        let file_path = resolved_dir.join(format!("doc_{document_id}.yaml"));
        Self::open_at(file_path)
    }

    fn open_at(file_path: PathBuf) -> Result<Self> {
        let comments = if file_path.exists() {
            Self::load_from_file(&file_path)?
        } else {
            Vec::new()
        };

        let mut store = Self {
            file_path,
            comments: Vec::new(),
            by_page: HashMap::new(),
        };

        for comment in comments {
            store.index(&comment);
            store.comments.push(comment);
        }

        Ok(store)
    }

    pub(crate) fn default_dir() -> Result<PathBuf> {
        if let Ok(custom) = std::env::var("GLOSSA_DATA_DIR") {
            return Ok(PathBuf::from(custom).join("comments"));
        }

        Ok(dirs::data_dir()
            .context("Could not determine data directory")?
            .join("glossa")
            .join("comments"))
    }

    pub fn add(&mut self, comment: Comment) -> Result<()> {
        self.index(&comment);
        self.comments.push(comment);

        self.sort_comments();
        self.save_to_disk()
    }

    pub fn edit_content(&mut self, id: &str, new_content: String) -> Result<()> {
        let idx = self.position(id).context("Comment not found")?;

        self.comments[idx].content = new_content;
        self.comments[idx].updated_at = Utc::now();

        self.save_to_disk()
    }

    pub fn set_status(&mut self, id: &str, status: CommentStatus) -> Result<()> {
        let idx = self.position(id).context("Comment not found")?;

        self.comments[idx].status = status;
        self.comments[idx].updated_at = Utc::now();

        self.save_to_disk()
    }

    pub fn add_reply(&mut self, id: &str, reply: Reply) -> Result<()> {
        let idx = self.position(id).context("Comment not found")?;

        self.comments[idx].replies.push(reply);
        self.comments[idx].updated_at = Utc::now();

        self.save_to_disk()
    }

    /// Toggle `user`'s like on a comment; returns the new liked state
    pub fn toggle_like(&mut self, id: &str, user: &str) -> Result<bool> {
        let idx = self.position(id).context("Comment not found")?;

        let liked = toggle(&mut self.comments[idx].likes, user);
        self.save_to_disk()?;
        Ok(liked)
    }

    /// Toggle `user`'s like on one reply; returns the new liked state
    pub fn toggle_reply_like(
        &mut self,
        comment_id: &str,
        reply_id: &str,
        user: &str,
    ) -> Result<bool> {
        let idx = self.position(comment_id).context("Comment not found")?;

        let reply = self.comments[idx]
            .replies
            .iter_mut()
            .find(|r| r.id == reply_id)
            .context("Reply not found")?;

        let liked = toggle(&mut reply.likes, user);
        self.save_to_disk()?;
        Ok(liked)
    }

    pub fn remove(&mut self, id: &str) -> Result<()> {
        let idx = self.position(id).context("Comment not found")?;

        self.comments.remove(idx);
        self.rebuild_index();

        self.save_to_disk()
    }

    /// Comments anchored to `page`, in display order
    #[must_use]
    pub fn on_page(&self, page: usize) -> Vec<&Comment> {
        self.by_page
            .get(&page)
            .map(|indices| indices.iter().map(|&i| &self.comments[i]).collect())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn all(&self) -> &[Comment] {
        &self.comments
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Comment> {
        self.comments.iter().find(|c| c.id == id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.comments.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.comments.is_empty()
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.comments.iter().position(|c| c.id == id)
    }

    fn load_from_file(file_path: &Path) -> Result<Vec<Comment>> {
        let content = fs::read_to_string(file_path).context("Failed to read comments file")?;

        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        serde_yaml::from_str(&content).context("Failed to parse comments YAML")
    }

    fn save_to_disk(&self) -> Result<()> {
        let yaml = serde_yaml::to_string(&self.comments).context("Failed to serialize comments")?;

        fs::write(&self.file_path, yaml).context("Failed to write comments file")?;

        Ok(())
    }

    fn index(&mut self, comment: &Comment) {
        let idx = self.comments.len();
        self.by_page.entry(comment.page).or_default().push(idx);
    }

    fn rebuild_index(&mut self) {
        self.by_page.clear();
        for (idx, comment) in self.comments.iter().enumerate() {
            self.by_page.entry(comment.page).or_default().push(idx);
        }
    }

    fn sort_comments(&mut self) {
        self.comments
            .sort_by(|a, b| a.page.cmp(&b.page).then(a.created_at.cmp(&b.created_at)));

        self.rebuild_index();
    }
}
