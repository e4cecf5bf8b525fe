//! Scenario tests for the novacast pipeline, run against stub collaborators

mod helpers;

mod concurrent_runs;
mod failure_handling;
mod ledger_history;
mod success_chain;
mod timeouts_and_cancellation;
