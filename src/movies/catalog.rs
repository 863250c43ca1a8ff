use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::CatalogError;

/// A single movie record. Immutable once the catalogue is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Movie {
    pub id: i32,
    pub title: String,
    pub director: String,
    pub year: i32,
    pub genre: String,
}

impl Movie {
    pub fn new(id: i32, title: &str, director: &str, year: i32, genre: &str) -> Self {
        Self {
            id,
            title: title.to_string(),
            director: director.to_string(),
            year,
            genre: genre.to_string(),
        }
    }
}

/// The reduced shape served by the `/api/movies` controller route
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieSummary {
    pub id: i32,
    pub title: String,
    pub director: String,
}

impl From<&Movie> for MovieSummary {
    fn from(movie: &Movie) -> Self {
        Self {
            id: movie.id,
            title: movie.title.clone(),
            director: movie.director.clone(),
        }
    }
}

/// Search filters. Every field defaults to "no filter"; blank values are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct MovieSearch {
    /// Case-insensitive substring of the title
    pub title: Option<String>,
    /// Case-insensitive substring of the director
    pub director: Option<String>,
    /// Case-insensitive exact genre
    pub genre: Option<String>,
}

impl MovieSearch {
    pub fn is_empty(&self) -> bool {
        active(&self.title).is_none()
            && active(&self.director).is_none()
            && active(&self.genre).is_none()
    }

    /// Whether `movie` passes every active filter
    pub fn matches(&self, movie: &Movie) -> bool {
        if let Some(title) = active(&self.title) {
            if !contains_ignore_case(&movie.title, title) {
                return false;
            }
        }
        if let Some(director) = active(&self.director) {
            if !contains_ignore_case(&movie.director, director) {
                return false;
            }
        }
        if let Some(genre) = active(&self.genre) {
            if movie.genre.to_lowercase() != genre.to_lowercase() {
                return false;
            }
        }
        true
    }
}

fn active(filter: &Option<String>) -> Option<&str> {
    filter.as_deref().filter(|value| !value.trim().is_empty())
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Read-only, in-memory movie store.
///
/// Identifiers are unique: construction fails on a duplicate, so lookups see
/// at most one match.
#[derive(Debug, Clone)]
pub struct MovieCatalog {
    movies: Vec<Movie>,
}

impl MovieCatalog {
    pub fn new(movies: Vec<Movie>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::with_capacity(movies.len());
        for movie in &movies {
            if !seen.insert(movie.id) {
                return Err(CatalogError::DuplicateId(movie.id));
            }
        }
        Ok(Self { movies })
    }

    /// The catalogue served at startup, checked like any other
    pub fn seeded() -> Result<Self, CatalogError> {
        Self::new(seed_movies())
    }

    pub fn all(&self) -> &[Movie] {
        &self.movies
    }

    pub fn get(&self, id: i32) -> Option<&Movie> {
        self.movies.iter().find(|movie| movie.id == id)
    }

    pub fn search(&self, search: &MovieSearch) -> Vec<Movie> {
        self.movies
            .iter()
            .filter(|movie| search.matches(movie))
            .cloned()
            .collect()
    }

    pub fn summaries(&self) -> Vec<MovieSummary> {
        self.movies.iter().map(MovieSummary::from).collect()
    }

    pub fn len(&self) -> usize {
        self.movies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movies.is_empty()
    }
}

/// The eight records served by default
pub fn seed_movies() -> Vec<Movie> {
    vec![
        Movie::new(1, "Inception", "Christopher Nolan", 2010, "Sci-Fi"),
        Movie::new(2, "The Matrix", "The Wachowskis", 1999, "Sci-Fi"),
        Movie::new(3, "Interstellar", "Christopher Nolan", 2014, "Sci-Fi"),
        Movie::new(4, "The Godfather", "Francis Ford Coppola", 1972, "Crime"),
        Movie::new(5, "Pulp Fiction", "Quentin Tarantino", 1994, "Crime"),
        Movie::new(6, "The Dark Knight", "Christopher Nolan", 2008, "Action"),
        Movie::new(7, "Forrest Gump", "Robert Zemeckis", 1994, "Drama"),
        Movie::new(8, "The Shawshank Redemption", "Frank Darabont", 1994, "Drama"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(movies: &[Movie]) -> Vec<i32> {
        movies.iter().map(|m| m.id).collect()
    }

    fn search(title: Option<&str>, director: Option<&str>, genre: Option<&str>) -> MovieSearch {
        MovieSearch {
            title: title.map(str::to_string),
            director: director.map(str::to_string),
            genre: genre.map(str::to_string),
        }
    }

    #[test]
    fn test_seeded_catalog_passes_uniqueness_check() {
        let catalog = MovieCatalog::seeded().expect("seed ids are unique");
        assert_eq!(catalog.len(), 8);
        assert_eq!(catalog.all(), seed_movies().as_slice());
    }

    #[test]
    fn test_duplicated_seed_rejected() {
        let mut movies = seed_movies();
        movies.push(movies[3].clone());
        assert_eq!(
            MovieCatalog::new(movies).unwrap_err(),
            CatalogError::DuplicateId(4)
        );
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let movies = vec![
            Movie::new(1, "Inception", "Christopher Nolan", 2010, "Sci-Fi"),
            Movie::new(1, "The Matrix", "The Wachowskis", 1999, "Sci-Fi"),
        ];
        assert_eq!(
            MovieCatalog::new(movies).unwrap_err(),
            CatalogError::DuplicateId(1)
        );
    }

    #[test]
    fn test_get_every_present_id() {
        let catalog = MovieCatalog::seeded().unwrap();
        for movie in catalog.all() {
            assert_eq!(catalog.get(movie.id), Some(movie));
        }
        assert_eq!(catalog.get(1).map(|m| m.title.as_str()), Some("Inception"));
    }

    #[test]
    fn test_get_absent_id() {
        let catalog = MovieCatalog::seeded().unwrap();
        assert!(catalog.get(999).is_none());
        assert!(catalog.get(0).is_none());
        assert!(catalog.get(-1).is_none());
    }

    #[test]
    fn test_director_search_is_case_insensitive() {
        let catalog = MovieCatalog::seeded().unwrap();
        for query in ["nolan", "NOLAN", "Christopher Nolan", "cHrIsToPhEr"] {
            let found = catalog.search(&search(None, Some(query), None));
            assert_eq!(ids(&found), vec![1, 3, 6], "query {}", query);
        }
    }

    #[test]
    fn test_title_search_returns_only_matches() {
        let catalog = MovieCatalog::seeded().unwrap();
        for needle in ["the", "In", "x", "redemption", "zzz"] {
            let found = catalog.search(&search(Some(needle), None, None));
            let lower = needle.to_lowercase();
            for movie in &found {
                assert!(movie.title.to_lowercase().contains(&lower));
            }
            let expected: Vec<i32> = catalog
                .all()
                .iter()
                .filter(|m| m.title.to_lowercase().contains(&lower))
                .map(|m| m.id)
                .collect();
            assert_eq!(ids(&found), expected);
        }
    }

    #[test]
    fn test_genre_is_exact_match() {
        let catalog = MovieCatalog::seeded().unwrap();
        assert_eq!(ids(&catalog.search(&search(None, None, Some("sci-fi")))), vec![1, 2, 3]);
        assert!(catalog.search(&search(None, None, Some("Sci"))).is_empty());
    }

    #[test]
    fn test_combined_filters_intersect() {
        let catalog = MovieCatalog::seeded().unwrap();
        let cases = [
            ("in", "nolan", "sci-fi"),
            ("the", "o", "drama"),
            ("e", "a", "crime"),
            ("dark", "nolan", "action"),
            ("matrix", "nolan", "sci-fi"),
        ];

        for (title, director, genre) in cases {
            let combined = ids(&catalog.search(&search(Some(title), Some(director), Some(genre))));

            let by_title = ids(&catalog.search(&search(Some(title), None, None)));
            let by_director = ids(&catalog.search(&search(None, Some(director), None)));
            let by_genre = ids(&catalog.search(&search(None, None, Some(genre))));
            let intersection: Vec<i32> = by_title
                .into_iter()
                .filter(|id| by_director.contains(id) && by_genre.contains(id))
                .collect();

            assert_eq!(combined, intersection);
        }
    }

    #[test]
    fn test_blank_filters_return_everything_in_order() {
        let catalog = MovieCatalog::seeded().unwrap();
        let everything = ids(catalog.all());

        let blank = search(Some(""), Some("   "), None);
        assert!(blank.is_empty());
        assert_eq!(ids(&catalog.search(&blank)), everything);
        assert_eq!(ids(&catalog.search(&MovieSearch::default())), everything);
    }

    #[test]
    fn test_no_match_is_empty_not_error() {
        let catalog = MovieCatalog::seeded().unwrap();
        assert!(catalog.search(&search(Some("Nonexistent"), None, None)).is_empty());
    }

    #[test]
    fn test_movie_serializes_camel_case() {
        let movie = MovieCatalog::seeded().unwrap().get(1).cloned().unwrap();
        let json = serde_json::to_value(&movie).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": 1,
                "title": "Inception",
                "director": "Christopher Nolan",
                "year": 2010,
                "genre": "Sci-Fi"
            })
        );
    }

    #[test]
    fn test_summaries_project_id_title_director() {
        let summaries = MovieCatalog::seeded().unwrap().summaries();
        assert_eq!(summaries.len(), 8);
        assert_eq!(
            summaries[1],
            MovieSummary {
                id: 2,
                title: "The Matrix".to_string(),
                director: "The Wachowskis".to_string(),
            }
        );
    }
}
