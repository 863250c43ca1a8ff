use axum::{
    extract::{Path, Query, State, rejection::PathRejection},
    response::Json,
};
use std::sync::Arc;
use tracing::{debug, info};

use super::{Movie, MovieCatalog, MovieSearch, MovieSummary};
use crate::error::AppError;
use crate::observability::current_trace_id;

/// GET /movies
pub async fn list_movies(State(catalog): State<Arc<MovieCatalog>>) -> Json<Vec<Movie>> {
    debug!(count = catalog.len(), "Listing all movies");
    Json(catalog.all().to_vec())
}

/// GET /movies/{id}
///
/// A segment that is not an integer is treated like an unknown id.
pub async fn get_movie(
    State(catalog): State<Arc<MovieCatalog>>,
    id: Result<Path<i32>, PathRejection>,
) -> Result<Json<Movie>, AppError> {
    let Ok(Path(id)) = id else {
        debug!("Movie id is not an integer");
        return Err(AppError::NotFound);
    };

    match catalog.get(id) {
        Some(movie) => Ok(Json(movie.clone())),
        None => {
            info!(
                movie.id = id,
                trace_id = %current_trace_id().unwrap_or_default(),
                "Movie not found"
            );
            Err(AppError::NotFound)
        }
    }
}

/// GET /movies/search?title=&director=&genre=
pub async fn search_movies(
    State(catalog): State<Arc<MovieCatalog>>,
    Query(search): Query<MovieSearch>,
) -> Json<Vec<Movie>> {
    let results = catalog.search(&search);
    info!(
        title = search.title.as_deref().unwrap_or(""),
        director = search.director.as_deref().unwrap_or(""),
        genre = search.genre.as_deref().unwrap_or(""),
        results = results.len(),
        "Movie search completed"
    );
    Json(results)
}

/// GET /api/movies
pub async fn list_movie_summaries(
    State(catalog): State<Arc<MovieCatalog>>,
) -> Json<Vec<MovieSummary>> {
    Json(catalog.summaries())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use tracing_test::traced_test;

    fn catalog() -> State<Arc<MovieCatalog>> {
        State(Arc::new(MovieCatalog::seeded().unwrap()))
    }

    #[tokio::test]
    async fn test_list_movies_returns_all_in_order() {
        let Json(movies) = list_movies(catalog()).await;
        let ids: Vec<i32> = movies.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[tokio::test]
    async fn test_get_movie_found() {
        let Json(movie) = get_movie(catalog(), Ok(Path(1))).await.unwrap();
        assert_eq!(movie.title, "Inception");
        assert_eq!(movie.director, "Christopher Nolan");
    }

    #[tokio::test]
    async fn test_get_movie_missing_is_404() {
        let result = get_movie(catalog(), Ok(Path(999))).await;
        assert!(matches!(result, Err(AppError::NotFound)));
        assert_eq!(result.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    #[traced_test]
    async fn test_get_movie_missing_is_logged() {
        let _ = get_movie(catalog(), Ok(Path(42))).await;
        assert!(logs_contain("Movie not found"));
        assert!(logs_contain("trace_id"));
    }

    #[tokio::test]
    async fn test_search_with_no_filters() {
        let Json(movies) = search_movies(catalog(), Query(MovieSearch::default())).await;
        assert_eq!(movies.len(), 8);
    }

    #[tokio::test]
    async fn test_summaries_route() {
        let Json(summaries) = list_movie_summaries(catalog()).await;
        assert_eq!(summaries.len(), 8);
        assert_eq!(summaries[0].title, "Inception");
    }
}
