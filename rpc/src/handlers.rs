//! Request handlers and wire types.
//!
//! Amounts travel as decimal strings so u128 values survive JSON number
//! limits; the literal `"max"` encodes the whole-balance sentinel. Rates are
//! decimal strings of the raw per-second scale. The caller field names the
//! principal the capability gate authorizes; transport authentication is a
//! deployment concern.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use coffer_service::CofferService;
use coffer_types::{Amount, HolderAddress, Rate};
use serde::{Deserialize, Serialize};

use crate::error::{RpcError, RpcResult};

// ── Exchange ─────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct DepositRequest {
    pub holder: String,
    pub amount: String,
}

#[derive(Serialize)]
pub struct DepositResponse {
    pub deposited: String,
    pub interest_realized: String,
    pub locked_rate: String,
}

pub async fn deposit(
    State(service): State<Arc<CofferService>>,
    Json(req): Json<DepositRequest>,
) -> RpcResult<Json<DepositResponse>> {
    let holder = parse_address(&req.holder)?;
    let amount = parse_amount(&req.amount)?;
    let outcome = service.deposit(&holder, amount)?;
    Ok(Json(DepositResponse {
        deposited: amount_string(outcome.deposited),
        interest_realized: amount_string(outcome.interest_realized),
        locked_rate: rate_string(outcome.locked_rate),
    }))
}

#[derive(Deserialize)]
pub struct RedeemRequest {
    pub holder: String,
    pub amount: String,
}

#[derive(Serialize)]
pub struct RedeemResponse {
    pub redeemed: String,
    pub interest_realized: String,
}

pub async fn redeem(
    State(service): State<Arc<CofferService>>,
    Json(req): Json<RedeemRequest>,
) -> RpcResult<Json<RedeemResponse>> {
    let holder = parse_address(&req.holder)?;
    let amount = parse_amount(&req.amount)?;
    let outcome = service.redeem(&holder, amount)?;
    Ok(Json(RedeemResponse {
        redeemed: amount_string(outcome.redeemed),
        interest_realized: amount_string(outcome.interest_realized),
    }))
}

#[derive(Deserialize)]
pub struct TopUpRequest {
    pub from: String,
    pub amount: String,
}

#[derive(Serialize)]
pub struct TopUpResponse {
    pub funded: String,
    pub vault_reserve: String,
}

pub async fn top_up(
    State(service): State<Arc<CofferService>>,
    Json(req): Json<TopUpRequest>,
) -> RpcResult<Json<TopUpResponse>> {
    let from = parse_address(&req.from)?;
    let amount = parse_amount(&req.amount)?;
    service.top_up(&from, amount)?;
    Ok(Json(TopUpResponse {
        funded: amount_string(amount),
        vault_reserve: amount_string(service.vault_reserve()),
    }))
}

// ── Transfers ────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct TransferRequest {
    pub from: String,
    pub to: String,
    pub amount: String,
}

#[derive(Serialize)]
pub struct TransferResponse {
    pub amount: String,
    pub rate_inherited: bool,
}

pub async fn transfer(
    State(service): State<Arc<CofferService>>,
    Json(req): Json<TransferRequest>,
) -> RpcResult<Json<TransferResponse>> {
    let from = parse_address(&req.from)?;
    let to = parse_address(&req.to)?;
    let amount = parse_amount(&req.amount)?;
    let outcome = service.transfer(&from, &to, amount)?;
    Ok(Json(TransferResponse {
        amount: amount_string(outcome.amount),
        rate_inherited: outcome.rate_inherited,
    }))
}

#[derive(Deserialize)]
pub struct TransferFromRequest {
    pub spender: String,
    pub from: String,
    pub to: String,
    pub amount: String,
}

pub async fn transfer_from(
    State(service): State<Arc<CofferService>>,
    Json(req): Json<TransferFromRequest>,
) -> RpcResult<Json<TransferResponse>> {
    let spender = parse_address(&req.spender)?;
    let from = parse_address(&req.from)?;
    let to = parse_address(&req.to)?;
    let amount = parse_amount(&req.amount)?;
    let outcome = service.transfer_from(&spender, &from, &to, amount)?;
    Ok(Json(TransferResponse {
        amount: amount_string(outcome.amount),
        rate_inherited: outcome.rate_inherited,
    }))
}

#[derive(Deserialize)]
pub struct ApproveRequest {
    pub owner: String,
    pub spender: String,
    pub amount: String,
}

#[derive(Serialize)]
pub struct ApproveResponse {
    pub allowance: String,
}

pub async fn approve(
    State(service): State<Arc<CofferService>>,
    Json(req): Json<ApproveRequest>,
) -> RpcResult<Json<ApproveResponse>> {
    let owner = parse_address(&req.owner)?;
    let spender = parse_address(&req.spender)?;
    let amount = parse_amount(&req.amount)?;
    service.approve(&owner, &spender, amount);
    Ok(Json(ApproveResponse {
        allowance: amount_string(service.allowance(&owner, &spender)),
    }))
}

// ── Privileged ───────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct MintRequest {
    pub caller: String,
    pub to: String,
    pub amount: String,
}

#[derive(Serialize)]
pub struct MintResponse {
    pub minted: String,
    pub interest_realized: String,
    pub locked_rate: String,
}

pub async fn mint(
    State(service): State<Arc<CofferService>>,
    Json(req): Json<MintRequest>,
) -> RpcResult<Json<MintResponse>> {
    let caller = parse_address(&req.caller)?;
    let to = parse_address(&req.to)?;
    let amount = parse_amount(&req.amount)?;
    let outcome = service.mint(&caller, &to, amount)?;
    Ok(Json(MintResponse {
        minted: amount_string(outcome.minted),
        interest_realized: amount_string(outcome.interest_realized),
        locked_rate: rate_string(outcome.locked_rate),
    }))
}

#[derive(Deserialize)]
pub struct BurnRequest {
    pub caller: String,
    pub from: String,
    pub amount: String,
}

#[derive(Serialize)]
pub struct BurnResponse {
    pub burned: String,
    pub interest_realized: String,
}

pub async fn burn(
    State(service): State<Arc<CofferService>>,
    Json(req): Json<BurnRequest>,
) -> RpcResult<Json<BurnResponse>> {
    let caller = parse_address(&req.caller)?;
    let from = parse_address(&req.from)?;
    let amount = parse_amount(&req.amount)?;
    let outcome = service.burn(&caller, &from, amount)?;
    Ok(Json(BurnResponse {
        burned: amount_string(outcome.burned),
        interest_realized: amount_string(outcome.interest_realized),
    }))
}

#[derive(Deserialize)]
pub struct SetRateRequest {
    pub caller: String,
    pub rate: String,
}

#[derive(Serialize)]
pub struct SetRateResponse {
    pub previous: String,
    pub current: String,
}

pub async fn set_rate(
    State(service): State<Arc<CofferService>>,
    Json(req): Json<SetRateRequest>,
) -> RpcResult<Json<SetRateResponse>> {
    let caller = parse_address(&req.caller)?;
    let new_rate = parse_rate(&req.rate)?;
    let change = service.set_rate(&caller, new_rate)?;
    Ok(Json(SetRateResponse {
        previous: rate_string(change.previous),
        current: rate_string(change.current),
    }))
}

// ── Views ────────────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct AccountResponse {
    pub address: String,
    pub balance: String,
    pub principal: String,
    /// `null` until the holder's first units lock a rate in.
    pub locked_rate: Option<String>,
    pub reserve_balance: String,
}

pub async fn account(
    State(service): State<Arc<CofferService>>,
    Path(address): Path<String>,
) -> RpcResult<Json<AccountResponse>> {
    let holder = parse_address(&address)?;
    Ok(Json(AccountResponse {
        address: holder.as_str().to_string(),
        balance: amount_string(service.balance_of(&holder)),
        principal: amount_string(service.principal_balance_of(&holder)),
        locked_rate: service.user_rate(&holder).map(rate_string),
        reserve_balance: amount_string(service.reserve_balance_of(&holder)),
    }))
}

#[derive(Serialize)]
pub struct RateResponse {
    pub rate: String,
}

pub async fn rate(State(service): State<Arc<CofferService>>) -> Json<RateResponse> {
    Json(RateResponse {
        rate: rate_string(service.global_rate()),
    })
}

#[derive(Serialize)]
pub struct SummaryResponse {
    pub holders: u64,
    pub total_principal: String,
    pub global_rate: String,
    pub vault_reserve: String,
}

pub async fn summary(State(service): State<Arc<CofferService>>) -> Json<SummaryResponse> {
    let summary = service.summary();
    Json(SummaryResponse {
        holders: summary.holders,
        total_principal: amount_string(summary.total_principal),
        global_rate: rate_string(summary.global_rate),
        vault_reserve: amount_string(summary.vault_reserve),
    })
}

// ── Parsing helpers ──────────────────────────────────────────────────────

fn parse_address(s: &str) -> RpcResult<HolderAddress> {
    HolderAddress::parse(s).map_err(|e| RpcError::InvalidRequest(e.to_string()))
}

/// Decimal string, or the literal `"max"` for the whole-balance sentinel.
fn parse_amount(s: &str) -> RpcResult<Amount> {
    if s == "max" {
        return Ok(Amount::MAX);
    }
    s.parse::<Amount>()
        .map_err(|e| RpcError::InvalidRequest(format!("amount {s:?}: {e}")))
}

fn parse_rate(s: &str) -> RpcResult<Rate> {
    let raw = s
        .parse::<u64>()
        .map_err(|_| RpcError::InvalidRequest(format!("rate {s:?} is not a whole number")))?;
    Ok(Rate::new(raw))
}

fn amount_string(amount: Amount) -> String {
    amount.raw().to_string()
}

fn rate_string(rate: Rate) -> String {
    rate.raw().to_string()
}
