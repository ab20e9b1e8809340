use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 可选标的：显示名称 -> 行情代码
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Instrument {
    pub name: &'static str,
    pub symbol: &'static str,
}

const fn instrument(name: &'static str, symbol: &'static str) -> Instrument {
    Instrument { name, symbol }
}

const US_INSTRUMENTS: &[Instrument] = &[
    instrument("Apple (AAPL)", "AAPL"),
    instrument("Microsoft (MSFT)", "MSFT"),
    instrument("Amazon (AMZN)", "AMZN"),
    instrument("Google (GOOGL)", "GOOGL"),
    instrument("Tesla (TSLA)", "TSLA"),
    instrument("S&P 500 ETF (SPY)", "SPY"),
];

const INDIA_INSTRUMENTS: &[Instrument] = &[
    instrument("Reliance Industries (RELIANCE.NS)", "RELIANCE.NS"),
    instrument("Tata Consultancy Services (TCS.NS)", "TCS.NS"),
    instrument("HDFC Bank (HDFCBANK.NS)", "HDFCBANK.NS"),
    instrument("ICICI Bank (ICICIBANK.NS)", "ICICIBANK.NS"),
    instrument("Hindustan Unilever (HINDUNILVR.NS)", "HINDUNILVR.NS"),
    instrument("ITC Ltd (ITC.NS)", "ITC.NS"),
    instrument("State Bank of India (SBIN.NS)", "SBIN.NS"),
    instrument("Axis Bank (AXISBANK.NS)", "AXISBANK.NS"),
    instrument("Bharti Airtel (BHARTIARTL.NS)", "BHARTIARTL.NS"),
    instrument("Asian Paints (ASIANPAINT.NS)", "ASIANPAINT.NS"),
    instrument("Titan Company (TITAN.NS)", "TITAN.NS"),
    instrument("Nestle India (NESTLEIND.NS)", "NESTLEIND.NS"),
    instrument("HDFC Life Insurance (HDFCLIFE.NS)", "HDFCLIFE.NS"),
    instrument("Bajaj Finance (BAJFINANCE.NS)", "BAJFINANCE.NS"),
    instrument("Bajaj Finserv (BAJAJFINSV.NS)", "BAJAJFINSV.NS"),
    instrument("Maruti Suzuki India (MARUTI.NS)", "MARUTI.NS"),
    instrument("UPL Ltd (UPL.NS)", "UPL.NS"),
    instrument("Wipro Ltd (WIPRO.NS)", "WIPRO.NS"),
    instrument("Coal India Ltd (COALINDIA.NS)", "COALINDIA.NS"),
    instrument("Larsen & Toubro Ltd (LT.NS)", "LT.NS"),
    instrument("Tech Mahindra Ltd (TECHM.NS)", "TECHM.NS"),
    instrument("HCL Technologies (HCLTECH.NS)", "HCLTECH.NS"),
    instrument("Sun Pharmaceutical Industries (SUNPHARMA.NS)", "SUNPHARMA.NS"),
    instrument("Power Grid Corporation of India (POWERGRID.NS)", "POWERGRID.NS"),
    instrument("NTPC Ltd (NTPC.NS)", "NTPC.NS"),
    instrument("Hindalco Industries (HINDALCO.NS)", "HINDALCO.NS"),
    instrument("Tata Steel Ltd (TATASTEEL.NS)", "TATASTEEL.NS"),
    instrument("Adani Ports & SEZ (ADANIPORTS.NS)", "ADANIPORTS.NS"),
    instrument("Shree Cement Ltd (SHREECEM.NS)", "SHREECEM.NS"),
    instrument("IndusInd Bank Ltd (INDUSINDBK.NS)", "INDUSINDBK.NS"),
    instrument("Britannia Industries (BRITANNIA.NS)", "BRITANNIA.NS"),
    instrument("Hero MotoCorp Ltd (HEROMOTOCO.NS)", "HEROMOTOCO.NS"),
    instrument("ICICI Prudential Life Insurance (ICICIPRULI.NS)", "ICICIPRULI.NS"),
    instrument("Dr. Reddy's Laboratories (DRREDDY.NS)", "DRREDDY.NS"),
    instrument("Mahindra & Mahindra Ltd (M&M.NS)", "M&M.NS"),
    instrument("UltraTech Cement Ltd (ULTRACEMCO.NS)", "ULTRACEMCO.NS"),
    instrument("Divi's Laboratories Ltd (DIVISLAB.NS)", "DIVISLAB.NS"),
    instrument("Cipla Ltd (CIPLA.NS)", "CIPLA.NS"),
    instrument("Eicher Motors Ltd (EICHERMOT.NS)", "EICHERMOT.NS"),
    instrument("SBI Life Insurance Company Ltd (SBILIFE.NS)", "SBILIFE.NS"),
    instrument("Pidilite Industries Ltd (PIDILITIND.NS)", "PIDILITIND.NS"),
    instrument("Godrej Consumer Products Ltd (GODREJCP.NS)", "GODREJCP.NS"),
    // 指数
    instrument("Bank Nifty (BANKNIFTY.NS)", "^NSEBANK"),
    instrument("Nifty 50 (NIFTY.NS)", "^NSEI"),
    instrument("Sensex (SENSEX.BSE)", "^BSESN"),
];

/// 市场
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Market {
    #[default]
    US,
    India,
}

impl Market {
    pub const ALL: [Market; 2] = [Market::US, Market::India];

    pub fn instruments(&self) -> &'static [Instrument] {
        match self {
            Market::US => US_INSTRUMENTS,
            Market::India => INDIA_INSTRUMENTS,
        }
    }

    /// 货币符号按市场决定，而非按标的；自定义代码跨市场时符号会不对
    pub fn currency_symbol(&self) -> &'static str {
        match self {
            Market::US => "$",
            Market::India => "₹",
        }
    }

    pub fn timezone(&self) -> Tz {
        match self {
            Market::US => chrono_tz::America::New_York,
            Market::India => chrono_tz::Asia::Kolkata,
        }
    }

    pub fn default_instrument(&self) -> Instrument {
        self.instruments()[0]
    }

    pub fn find_instrument(&self, name: &str) -> Option<Instrument> {
        self.instruments().iter().copied().find(|i| i.name == name)
    }

    /// 确定要加载的代码：自定义代码优先，未知选项回退到第一个标的
    pub fn resolve_ticker(&self, selected: Option<&str>, custom: Option<&str>) -> String {
        if let Some(custom) = custom.map(str::trim).filter(|s| !s.is_empty()) {
            return custom.to_string();
        }

        selected
            .and_then(|name| self.find_instrument(name))
            .unwrap_or_else(|| self.default_instrument())
            .symbol
            .to_string()
    }
}

impl fmt::Display for Market {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Market::US => write!(f, "US"),
            Market::India => write!(f, "India"),
        }
    }
}

impl FromStr for Market {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "us" => Ok(Market::US),
            "india" | "in" => Ok(Market::India),
            other => Err(format!("Unknown market: {}", other)),
        }
    }
}
