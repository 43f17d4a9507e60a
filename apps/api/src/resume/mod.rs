// Résumé builder: schema-checked assembly of AI output plus its HTTP surface.

pub mod assembler;
pub mod handlers;
