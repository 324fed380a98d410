// 11.6: funding accrual reporting. computes the pro-rated payment for every
// open position from its market's annualized rate and hands the list back to
// the caller. position margin is untouched: settling payments against
// balances belongs to the external ledger, same as margin reservation.

use super::core::PerpetualsEngine;
use crate::events::{EventPayload, FundingAccruedEvent};
use crate::funding::{funding_payment, FundingPayment};
use crate::types::Quote;
use rust_decimal::Decimal;

impl PerpetualsEngine {
    /// Compute funding accrued over `hours` for every open position.
    pub fn accrue_funding(&mut self, hours: Decimal) -> Vec<FundingPayment> {
        let mut payments: Vec<FundingPayment> = Vec::new();

        for (ticker, position_ids) in &self.open_by_ticker {
            let Some(market) = self.markets.get(ticker) else {
                continue;
            };

            for position_id in position_ids {
                let Some(position) = self.positions.get(position_id) else {
                    continue;
                };

                let amount = funding_payment(position.size, market.funding_rate, hours);
                payments.push(FundingPayment {
                    position_id: *position_id,
                    user_id: position.user_id.clone(),
                    ticker: ticker.clone(),
                    side: position.side,
                    amount,
                    annual_rate: market.funding_rate,
                    hours,
                });
            }
        }

        let net: Quote = payments.iter().map(|p| p.amount).sum();
        self.emit_event(EventPayload::FundingAccrued(FundingAccruedEvent {
            hours,
            positions: payments.len(),
            net_amount: net,
        }));

        payments
    }
}
