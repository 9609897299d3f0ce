//! The movie sample dataset the built-in examples are written against.
//!
//! All writes use MERGE, so loading twice is harmless.

use neo4rs::query;

use crate::client::{GraphClient, GraphError};

/// Public CSV with one row per movie.
pub const MOVIES_CSV_URL: &str =
    "https://raw.githubusercontent.com/tomasonjo/blog-datasets/main/movies/movies_small.csv";

const LOAD_MOVIES: &str = "LOAD CSV WITH HEADERS FROM $url AS row
MERGE (m:Movie {id: row.movieId})
SET m.released = date(row.released),
    m.title = row.title,
    m.imdbRating = toFloat(row.imdbRating)
FOREACH (director IN split(row.director, '|') |
    MERGE (p:Person {name: trim(director)})
    MERGE (p)-[:DIRECTED]->(m))
FOREACH (actor IN split(row.actors, '|') |
    MERGE (p:Person {name: trim(actor)})
    MERGE (p)-[:ACTED_IN]->(m))
FOREACH (genre IN split(row.genres, '|') |
    MERGE (g:Genre {name: trim(genre)})
    MERGE (m)-[:IN_GENRE]->(g))";

impl GraphClient {
    /// Load movies, their actors, directors, and genres from `csv_url`.
    pub async fn load_movie_data(&self, csv_url: &str) -> Result<(), GraphError> {
        let q = query(LOAD_MOVIES).param("url", csv_url.to_string());
        self.run(q).await?;
        tracing::info!(url = %csv_url, "Movie data loaded");
        Ok(())
    }
}
