// Paginated result of a tracking query
use super::telemetry::TelemetryRecord;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TelemetryPage {
    pub records: Vec<TelemetryRecord>,
    pub total_count: usize,
    pub page_num: u64,
    pub items_per_page: u64,
    pub total_pages: u64,
    pub process_message: Option<String>,
    pub have_warnings: bool,
}

/// Pagination block as the server sent it. Zero counts are treated as absent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PaginationHints {
    pub page_num: Option<u64>,
    pub items_per_page: Option<u64>,
    pub total_records: Option<u64>,
    pub total_pages: Option<u64>,
}

impl TelemetryPage {
    pub fn new(records: Vec<TelemetryRecord>, hints: PaginationHints) -> Self {
        let len = records.len() as u64;
        let nonzero = |v: Option<u64>| v.filter(|n| *n > 0);

        let items_per_page = nonzero(hints.items_per_page).unwrap_or(len);
        let total_pages = nonzero(hints.total_pages).unwrap_or_else(|| {
            if items_per_page == 0 {
                0
            } else {
                len.div_ceil(items_per_page)
            }
        });

        Self {
            total_count: nonzero(hints.total_records).map_or(records.len(), |n| n as usize),
            page_num: nonzero(hints.page_num).unwrap_or(1),
            items_per_page,
            total_pages,
            records,
            process_message: None,
            have_warnings: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records(n: usize) -> Vec<TelemetryRecord> {
        (0..n)
            .map(|i| TelemetryRecord {
                id: Some(i as i64),
                ..Default::default()
            })
            .collect()
    }

    #[test]
    fn test_total_count_falls_back_to_record_count() {
        let page = TelemetryPage::new(
            records(3),
            PaginationHints {
                page_num: Some(1),
                items_per_page: Some(10),
                ..Default::default()
            },
        );
        assert_eq!(page.total_count, 3);
        assert_eq!(page.total_pages, 1);
        assert_eq!(page.items_per_page, 10);
    }

    #[test]
    fn test_server_counts_win_when_present() {
        let page = TelemetryPage::new(
            records(2),
            PaginationHints {
                page_num: Some(4),
                items_per_page: Some(2),
                total_records: Some(57),
                total_pages: Some(29),
            },
        );
        assert_eq!(page.total_count, 57);
        assert_eq!(page.total_pages, 29);
        assert_eq!(page.page_num, 4);
    }

    #[test]
    fn test_missing_pagination_block() {
        let page = TelemetryPage::new(records(5), PaginationHints::default());
        assert_eq!(page.page_num, 1);
        assert_eq!(page.items_per_page, 5);
        assert_eq!(page.total_pages, 1);

        let empty = TelemetryPage::new(Vec::new(), PaginationHints::default());
        assert_eq!(empty.total_count, 0);
        assert_eq!(empty.total_pages, 0);
    }
}
