// src/navigator/history.rs
use url::Url;

/// Back/forward stack of visited locations. Lives for the session only.
#[derive(Debug, Clone, Default)]
pub struct History {
    visited: Vec<Url>,
    cursor: Option<usize>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a new location, dropping anything ahead of the cursor.
    pub fn visit(&mut self, location: Url) {
        if let Some(cursor) = self.cursor {
            self.visited.truncate(cursor + 1);
        }
        self.visited.push(location);
        self.cursor = Some(self.visited.len() - 1);
    }

    pub fn back(&mut self) -> Option<&Url> {
        match self.cursor {
            Some(cursor) if cursor > 0 => {
                self.cursor = Some(cursor - 1);
                self.visited.get(cursor - 1)
            }
            _ => None,
        }
    }

    pub fn forward(&mut self) -> Option<&Url> {
        match self.cursor {
            Some(cursor) if cursor + 1 < self.visited.len() => {
                self.cursor = Some(cursor + 1);
                self.visited.get(cursor + 1)
            }
            _ => None,
        }
    }

    pub fn can_go_back(&self) -> bool {
        matches!(self.cursor, Some(cursor) if cursor > 0)
    }

    pub fn can_go_forward(&self) -> bool {
        matches!(self.cursor, Some(cursor) if cursor + 1 < self.visited.len())
    }

    pub fn current(&self) -> Option<&Url> {
        self.cursor.and_then(|cursor| self.visited.get(cursor))
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.visited.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visited.is_empty()
    }

    pub fn entries(&self) -> &[Url] {
        &self.visited
    }
}
