pub mod lotacao;
pub mod notify;
