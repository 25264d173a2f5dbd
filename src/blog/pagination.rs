use serde::{Deserialize, Serialize};

/// `?page=N` query parameter, kept as text so that junk falls back to page 1
#[derive(Debug, Default, Clone, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    pub count: i64,
    pub per_page: i64,
}

impl Paginator {
    pub fn new(count: i64, per_page: i64) -> Self {
        Self {
            count: count.max(0),
            per_page: per_page.max(1),
        }
    }

    /// Always at least one page, even for an empty listing
    pub fn num_pages(&self) -> i64 {
        if self.count == 0 {
            1
        } else {
            (self.count + self.per_page - 1) / self.per_page
        }
    }

    /// Non-numeric or missing input gives the first page; out-of-range input is clamped
    pub fn get_page(&self, raw: Option<&str>) -> i64 {
        match raw.map(str::trim).and_then(|s| s.parse::<i64>().ok()) {
            None => 1,
            Some(n) if n < 1 => 1,
            Some(n) => n.min(self.num_pages()),
        }
    }

    pub fn offset(&self, number: i64) -> i64 {
        (number - 1) * self.per_page
    }

    pub fn page<T>(&self, number: i64, items: Vec<T>) -> Page<T> {
        let num_pages = self.num_pages();
        Page {
            items,
            number,
            num_pages,
            count: self.count,
            per_page: self.per_page,
            has_next: number < num_pages,
            has_previous: number > 1,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub number: i64,
    pub num_pages: i64,
    pub count: i64,
    pub per_page: i64,
    pub has_next: bool,
    pub has_previous: bool,
}

impl<T> Page<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            number: self.number,
            num_pages: self.num_pages,
            count: self.count,
            per_page: self.per_page,
            has_next: self.has_next,
            has_previous: self.has_previous,
        }
    }
}
