/*
 * Responsibility
 * - middleware の公開インターフェース (re-export)
 * - auth (interceptor + access policy), cors, http
 */
pub mod auth;
pub mod cors;
pub mod http;
