//! The few-shot example bank and the starter questions.
//!
//! The examples are written against the movie graph loaded by
//! `graphquery_graph::movies`. Their order is rendered verbatim into every
//! prompt.

use graphquery_core::Example;

const BASE_EXAMPLES: &[(&str, &str)] = &[
    (
        "How many artists are there?",
        "MATCH (a:Person)-[:ACTED_IN]->(:Movie) RETURN count(DISTINCT a) AS actors",
    ),
    (
        "Which actors played in the movie Casino?",
        "MATCH (m:Movie {title: 'Casino'})<-[:ACTED_IN]-(a:Person) RETURN a.name AS actor",
    ),
    (
        "How many movies has Tom Hanks acted in?",
        "MATCH (a:Person {name: 'Tom Hanks'})-[:ACTED_IN]->(m:Movie) RETURN count(m) AS movies",
    ),
    (
        "List all the genres of the movie Schindler's List",
        "MATCH (m:Movie {title: 'Schindler\\'s List'})-[:IN_GENRE]->(g:Genre) RETURN g.name AS genre",
    ),
    (
        "Which actors have worked in movies from both the comedy and action genres?",
        "MATCH (a:Person)-[:ACTED_IN]->(:Movie)-[:IN_GENRE]->(g1:Genre), (a)-[:ACTED_IN]->(:Movie)-[:IN_GENRE]->(g2:Genre) WHERE g1.name = 'Comedy' AND g2.name = 'Action' RETURN DISTINCT a.name AS actor",
    ),
    (
        "Which actors acted in more than one movie?",
        "MATCH (a:Person)-[:ACTED_IN]->(m:Movie) WITH a, count(DISTINCT m) AS movies WHERE movies > 1 RETURN a.name AS actor, movies AS count",
    ),
    (
        "Find movies with imdb rating higher than 8",
        "MATCH (m:Movie) WHERE m.imdbRating > 8.0 RETURN m.title AS title, m.imdbRating AS rating",
    ),
    (
        "List top 3 movies by rating",
        "MATCH (m:Movie) RETURN m.title AS title, m.imdbRating AS rating ORDER BY m.imdbRating DESC LIMIT 3",
    ),
];

/// Questions offered to new users as a starting point.
pub const SAMPLE_QUESTIONS: &[&str] = &[
    "How many movies are there?",
    "Which actors played in Casino?",
    "How many movies has Tom Hanks acted in?",
    "List genres of Schindler's List",
    "Find movies with imdb rating higher than 8",
    "Which actors acted in more than one movie?",
];

/// The built-in demonstrations, in prompt order.
pub fn get_examples() -> Vec<Example> {
    BASE_EXAMPLES
        .iter()
        .map(|(question, query)| Example::new(*question, *query))
        .collect()
}

/// The built-in demonstrations followed by `extra`, in order.
pub fn add_examples(extra: &[Example]) -> Vec<Example> {
    let mut examples = get_examples();
    examples.extend_from_slice(extra);
    examples
}
