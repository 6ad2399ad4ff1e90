//! 백테스팅용 시뮬레이션 거래소.
//!
//! 실제 게이트웨이를 감싸 과거 데이터 조회는 위임하고, 가상 시계와
//! 가상 포트폴리오 위에서 주문 체결을 시뮬레이션합니다.
//!
//! # 예제
//!
//! ```ignore
//! use quant_exchange::simulated::SimulatedExchange;
//!
//! let simulator = SimulatedExchange::new(gateway, portfolio, start);
//! simulator.subscribe(Interval::M1, strategy.clone()).await;
//! simulator.backtest(start, end, Interval::M1.duration()).await?;
//! ```

mod exchange;

pub use exchange::SimulatedExchange;
