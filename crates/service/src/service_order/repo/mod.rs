pub mod seaorm;

pub use seaorm::SeaOrmServiceOrderRepository;
