pub mod quizgen_client;
