//! Paginación de listados

use serde::Serialize;

/// Página pedida por el llamador, ya normalizada
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

impl PageRequest {
    pub const DEFAULT_LIMIT: u32 = 10;
    pub const MAX_LIMIT: u32 = 100;

    /// Página menor que 1 pasa a 1; un límite fuera de 1..=100 vuelve al valor por defecto
    pub fn new(page: Option<u32>, limit: Option<u32>) -> Self {
        let page = page.filter(|p| *p >= 1).unwrap_or(1);
        let limit = limit
            .filter(|l| (1..=Self::MAX_LIMIT).contains(l))
            .unwrap_or(Self::DEFAULT_LIMIT);
        Self { page, limit }
    }

    pub fn offset(&self) -> i64 {
        (i64::from(self.page) - 1) * i64::from(self.limit)
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.limit)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// Response de listados paginados
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub total: i64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u32,
    pub has_next: bool,
    pub has_previous: bool,
}

impl<T> Page<T> {
    /// `data` ya es la página; `total` cuenta todos los registros del filtro
    pub fn new(data: Vec<T>, total: i64, request: PageRequest) -> Self {
        let total = total.max(0);
        let total_pages = u32::try_from((total + request.limit() - 1) / request.limit()).unwrap_or(u32::MAX);

        Self {
            data,
            total,
            page: request.page,
            limit: request.limit,
            total_pages,
            has_next: request.page < total_pages,
            has_previous: request.page > 1,
        }
    }

    /// Corta la página de un listado completo ya ordenado
    pub fn slice(all: Vec<T>, request: PageRequest) -> Self {
        let total = all.len() as i64;
        let offset = usize::try_from(request.offset()).unwrap_or(usize::MAX);
        let data = all.into_iter().skip(offset).take(request.limit as usize).collect();
        Self::new(data, total, request)
    }
}
