use std::collections::HashSet;

/// Placeholder shown while nothing is selected.
pub const EMPTY_SELECTION_TEXT: &str = "Select products...";

/// Multi-select over the product catalog with substring search and a
/// select-all that operates on the filtered view.
#[derive(Debug, Default)]
pub struct ProductSelectionModel {
    catalog: Vec<String>,
    selected: HashSet<String>,
    search_term: String,
}

impl ProductSelectionModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the catalog. Selections referring to products no longer in
    /// the catalog are deliberately left untouched; callers that need
    /// pruning must clear or re-toggle explicitly.
    pub fn set_catalog(&mut self, products: Vec<String>) {
        self.catalog = products;
    }

    pub fn catalog(&self) -> &[String] {
        &self.catalog
    }

    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.search_term = term.into();
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    /// Catalog entries containing the search term, case-insensitively,
    /// in catalog order. An empty term matches everything.
    pub fn filtered(&self) -> Vec<&str> {
        let needle = self.search_term.to_lowercase();
        self.catalog
            .iter()
            .filter(|product| needle.is_empty() || product.to_lowercase().contains(&needle))
            .map(String::as_str)
            .collect()
    }

    pub fn toggle(&mut self, product: &str) {
        if !self.selected.remove(product) {
            self.selected.insert(product.to_owned());
        }
    }

    /// Select-all over the currently filtered subset: if every filtered item
    /// is already selected the whole selection is cleared; otherwise the
    /// selection becomes exactly the filtered subset, dropping anything
    /// selected outside the current filter.
    pub fn select_all_filtered(&mut self) {
        let filtered: Vec<String> = self.filtered().iter().map(|s| (*s).to_owned()).collect();
        let all_selected =
            !filtered.is_empty() && filtered.iter().all(|product| self.selected.contains(product));
        if all_selected {
            self.selected.clear();
        } else {
            self.selected = filtered.into_iter().collect();
        }
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    pub fn is_selected(&self, product: &str) -> bool {
        self.selected.contains(product)
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    /// Selected products in catalog order, followed by any selections that
    /// survived a catalog reload without being present in it.
    pub fn selected(&self) -> Vec<String> {
        let mut ordered: Vec<String> = self
            .catalog
            .iter()
            .filter(|product| self.selected.contains(*product))
            .cloned()
            .collect();
        let mut stale: Vec<String> = self
            .selected
            .iter()
            .filter(|product| !self.catalog.contains(*product))
            .cloned()
            .collect();
        stale.sort();
        ordered.extend(stale);
        ordered
    }

    /// Collapsed one-line summary: placeholder, the lone name, up to three
    /// comma-joined names, then "N products selected".
    pub fn display_text(&self) -> String {
        let names = self.selected();
        match names.len() {
            0 => EMPTY_SELECTION_TEXT.to_owned(),
            1 => names[0].clone(),
            2 | 3 => names.join(", "),
            n => format!("{n} products selected"),
        }
    }
}
