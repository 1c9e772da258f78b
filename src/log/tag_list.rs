use crate::log::tag::Tag;
use crate::log::tag_value::TagValue;
use std::fmt::{Debug, Display, Formatter};
use std::ops::{Deref, DerefMut};

/// This struct converts a tuple of tags to a vector of tags.
/// It supports tuples of length 0 through 5.
#[derive(Clone, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct TagList(pub Vec<Tag>);
impl TagList {
    #[must_use]
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, name: &'static str, value: impl Into<TagValue>) {
        self.0.push(Tag::new(name, value));
    }

    #[must_use]
    pub fn with(mut self, name: &'static str, value: impl Into<TagValue>) -> Self {
        self.push(name, value);
        self
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<Tag> {
        self.0
    }
}
impl Default for TagList {
    fn default() -> Self {
        Self::new()
    }
}
impl Deref for TagList {
    type Target = Vec<Tag>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
impl DerefMut for TagList {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}
impl Display for TagList {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        if let Some(tag) = self.0.first() {
            write!(f, "{:?}:{}", tag.name, tag.value)?;
        }
        for tag in self.0.iter().skip(1) {
            write!(f, ",{:?}:{}", tag.name, tag.value)?;
        }
        Ok(())
    }
}
impl Debug for TagList {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        write!(f, "TagList{{{self}}}")
    }
}
impl From<Vec<Tag>> for TagList {
    fn from(tags: Vec<Tag>) -> Self {
        Self(tags)
    }
}
impl From<Tag> for TagList {
    fn from(tag: Tag) -> Self {
        Self(vec![tag])
    }
}
impl From<()> for TagList {
    fn from((): ()) -> Self {
        Self(Vec::new())
    }
}
impl From<(Tag,)> for TagList {
    fn from(tags: (Tag,)) -> Self {
        Self(vec![tags.0])
    }
}
impl From<(Tag, Tag)> for TagList {
    fn from(tags: (Tag, Tag)) -> Self {
        Self(vec![tags.0, tags.1])
    }
}
impl From<(Tag, Tag, Tag)> for TagList {
    fn from(tags: (Tag, Tag, Tag)) -> Self {
        Self(vec![tags.0, tags.1, tags.2])
    }
}
impl From<(Tag, Tag, Tag, Tag)> for TagList {
    fn from(tags: (Tag, Tag, Tag, Tag)) -> Self {
        Self(vec![tags.0, tags.1, tags.2, tags.3])
    }
}
impl From<(Tag, Tag, Tag, Tag, Tag)> for TagList {
    fn from(tags: (Tag, Tag, Tag, Tag, Tag)) -> Self {
        Self(vec![tags.0, tags.1, tags.2, tags.3, tags.4])
    }
}
