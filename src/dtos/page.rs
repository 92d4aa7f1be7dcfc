//! Paginazione - Pageable in ingresso, Slice dal repository, Page verso il client

use serde::Serialize;

pub const DEFAULT_PAGE_NUMBER: u32 = 0;
pub const DEFAULT_PAGE_SIZE: u32 = 5;
pub const MAX_PAGE_SIZE: u32 = 100;

/// Pagina richiesta: `number` parte da 0, `size == 0` disattiva la paginazione
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pageable {
    pub number: u32,
    pub size: u32,
}

impl Default for Pageable {
    fn default() -> Self {
        Self {
            number: DEFAULT_PAGE_NUMBER,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Pageable {
    /// Costruisce la pagina dai parametri del client (`page` parte da 1).
    /// Valori mancanti, non interi o fuori intervallo usano i default.
    pub fn from_query(page: Option<&str>, size: Option<&str>) -> Self {
        let number = page
            .and_then(|p| p.trim().parse::<u32>().ok())
            .filter(|p| *p > 0)
            .map(|p| p - 1)
            .unwrap_or(DEFAULT_PAGE_NUMBER);

        let size = size
            .and_then(|s| s.trim().parse::<u32>().ok())
            .filter(|s| *s > 0 && *s <= MAX_PAGE_SIZE)
            .unwrap_or(DEFAULT_PAGE_SIZE);

        Self { number, size }
    }

    /// Nessun limite: tutte le righe in una pagina
    pub fn unpaged() -> Self {
        Self { number: 0, size: 0 }
    }

    pub fn is_paged(&self) -> bool {
        self.size > 0
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.number) * u64::from(self.size)
    }
}

/// Risultato di una ricerca: righe della pagina e numero totale di righe trovate
#[derive(Debug, Clone)]
pub struct Slice<T> {
    pub content: Vec<T>,
    pub total_elements: i64,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub size: u32,
    pub number: u32,
    pub total_elements: i64,
    pub total_pages: i64,
}

/// Pagina restituita da REST
#[derive(Serialize, Debug, Clone)]
pub struct Page<T> {
    pub content: Vec<T>,
    pub page: PageInfo,
}

impl<T> Page<T> {
    pub fn new(slice: Slice<T>, pageable: Pageable) -> Self {
        let total_pages = if pageable.is_paged() {
            let size = i64::from(pageable.size);
            (slice.total_elements + size - 1) / size
        } else {
            1
        };
        Self {
            content: slice.content,
            page: PageInfo {
                size: pageable.size,
                number: pageable.number,
                total_elements: slice.total_elements,
                total_pages,
            },
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            content: self.content.into_iter().map(f).collect(),
            page: self.page,
        }
    }
}
