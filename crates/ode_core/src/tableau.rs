//! Butcher tableaux for every stepper, each built once by a `new()`
//! constructor in the problem's unit-free numeric type `U`. Coefficients are
//! never recomputed inside `perform_step` — only read from these frozen
//! structs.

use crate::traits::Scalar;

/// `a / b` evaluated in `U`, used for coefficients given as exact rationals
/// in the literature so extended-precision `U` sees the full ratio rather
/// than a pre-rounded `f64` decimal.
fn ratio<U: Scalar>(a: f64, b: f64) -> U {
    U::from_f64(a).unwrap() / U::from_f64(b).unwrap()
}

fn lit<U: Scalar>(v: f64) -> U {
    U::from_f64(v).unwrap()
}

/// Explicit Euler has no stage coefficients; kept as a unit struct so the
/// stepper still carries a `Tableau` field uniformly with the other methods.
pub struct EulerTableau;

impl EulerTableau {
    pub fn new() -> Self {
        EulerTableau
    }
}

impl Default for EulerTableau {
    fn default() -> Self {
        Self::new()
    }
}

pub struct MidpointTableau<U> {
    pub half: U,
}

impl<U: Scalar> MidpointTableau<U> {
    pub fn new() -> Self {
        Self { half: ratio(1.0, 2.0) }
    }
}

impl<U: Scalar> Default for MidpointTableau<U> {
    fn default() -> Self {
        Self::new()
    }
}

pub struct Rk4Tableau<U> {
    pub half: U,
    pub sixth: U,
    pub two: U,
}

impl<U: Scalar> Rk4Tableau<U> {
    pub fn new() -> Self {
        Self {
            half: ratio(1.0, 2.0),
            sixth: ratio(1.0, 6.0),
            two: lit(2.0),
        }
    }
}

impl<U: Scalar> Default for Rk4Tableau<U> {
    fn default() -> Self {
        Self::new()
    }
}

/// Bogacki-Shampine 3(2), the classic FSAL `ode23` pair.
pub struct Bs3Tableau<U> {
    pub c2: U,
    pub c3: U,
    pub a21: U,
    pub a32: U,
    pub a41: U,
    pub a42: U,
    pub a43: U,
    pub bhat1: U,
    pub bhat2: U,
    pub bhat3: U,
    pub bhat4: U,
}

impl<U: Scalar> Bs3Tableau<U> {
    pub fn new() -> Self {
        Self {
            c2: ratio(1.0, 2.0),
            c3: ratio(3.0, 4.0),
            a21: ratio(1.0, 2.0),
            a32: ratio(3.0, 4.0),
            a41: ratio(2.0, 9.0),
            a42: ratio(1.0, 3.0),
            a43: ratio(4.0, 9.0),
            bhat1: ratio(7.0, 24.0),
            bhat2: ratio(1.0, 4.0),
            bhat3: ratio(1.0, 3.0),
            bhat4: ratio(1.0, 8.0),
        }
    }
}

impl<U: Scalar> Default for Bs3Tableau<U> {
    fn default() -> Self {
        Self::new()
    }
}

/// Dormand-Prince 5(4), the classic FSAL `dopri5` pair, with its order-4
/// continuous-extension (dense output) weights `d_i`.
pub struct Dp5Tableau<U> {
    pub c2: U,
    pub c3: U,
    pub c4: U,
    pub c5: U,
    pub a21: U,
    pub a31: U,
    pub a32: U,
    pub a41: U,
    pub a42: U,
    pub a43: U,
    pub a51: U,
    pub a52: U,
    pub a53: U,
    pub a54: U,
    pub a61: U,
    pub a62: U,
    pub a63: U,
    pub a64: U,
    pub a65: U,
    pub a71: U,
    pub a73: U,
    pub a74: U,
    pub a75: U,
    pub a76: U,
    pub b1: U,
    pub b3: U,
    pub b4: U,
    pub b5: U,
    pub b6: U,
    pub bhat1: U,
    pub bhat3: U,
    pub bhat4: U,
    pub bhat5: U,
    pub bhat6: U,
    pub bhat7: U,
    pub d1: U,
    pub d3: U,
    pub d4: U,
    pub d5: U,
    pub d6: U,
    pub d7: U,
}

impl<U: Scalar> Dp5Tableau<U> {
    pub fn new() -> Self {
        Self {
            c2: ratio(1.0, 5.0),
            c3: ratio(3.0, 10.0),
            c4: ratio(4.0, 5.0),
            c5: ratio(8.0, 9.0),
            a21: ratio(1.0, 5.0),
            a31: ratio(3.0, 40.0),
            a32: ratio(9.0, 40.0),
            a41: ratio(44.0, 45.0),
            a42: ratio(-56.0, 15.0),
            a43: ratio(32.0, 9.0),
            a51: ratio(19372.0, 6561.0),
            a52: ratio(-25360.0, 2187.0),
            a53: ratio(64448.0, 6561.0),
            a54: ratio(-212.0, 729.0),
            a61: ratio(9017.0, 3168.0),
            a62: ratio(-355.0, 33.0),
            a63: ratio(46732.0, 5247.0),
            a64: ratio(49.0, 176.0),
            a65: ratio(-5103.0, 18656.0),
            a71: ratio(35.0, 384.0),
            a73: ratio(500.0, 1113.0),
            a74: ratio(125.0, 192.0),
            a75: ratio(-2187.0, 6784.0),
            a76: ratio(11.0, 84.0),
            b1: ratio(35.0, 384.0),
            b3: ratio(500.0, 1113.0),
            b4: ratio(125.0, 192.0),
            b5: ratio(-2187.0, 6784.0),
            b6: ratio(11.0, 84.0),
            bhat1: ratio(5179.0, 57600.0),
            bhat3: ratio(7571.0, 16695.0),
            bhat4: ratio(393.0, 640.0),
            bhat5: ratio(-92097.0, 339200.0),
            bhat6: ratio(187.0, 2100.0),
            bhat7: ratio(1.0, 40.0),
            d1: ratio(-12715105075.0, 11282082432.0),
            d3: ratio(87487479700.0, 32700410799.0),
            d4: ratio(-10690763975.0, 1880347072.0),
            d5: ratio(701980252019.0, 199316789632.0),
            d6: ratio(-1453857185.0, 822651844.0),
            d7: ratio(69997945.0, 29380423.0),
        }
    }
}

impl<U: Scalar> Default for Dp5Tableau<U> {
    fn default() -> Self {
        Self::new()
    }
}

/// Tsitouras 5(4). Published as decimal literals rather than simple
/// fractions (Tsitouras's original paper gives them this way); the
/// embedded-pair weights are derived below rather than taken from a
/// fixed-step source, since no fixed-step method carries them.
pub struct Tsit5Tableau<U> {
    pub c2: U,
    pub c3: U,
    pub c4: U,
    pub c5: U,
    pub a21: U,
    pub a31: U,
    pub a32: U,
    pub a41: U,
    pub a42: U,
    pub a43: U,
    pub a51: U,
    pub a52: U,
    pub a53: U,
    pub a54: U,
    pub a61: U,
    pub a62: U,
    pub a63: U,
    pub a64: U,
    pub a65: U,
    pub a71: U,
    pub a72: U,
    pub a73: U,
    pub a74: U,
    pub a75: U,
    pub a76: U,
    pub b1: U,
    pub b2: U,
    pub b3: U,
    pub b4: U,
    pub b5: U,
    pub b6: U,
    pub bhat1: U,
    pub bhat2: U,
    pub bhat3: U,
    pub bhat4: U,
    pub bhat5: U,
    pub bhat6: U,
    pub bhat7: U,
}

impl<U: Scalar> Tsit5Tableau<U> {
    pub fn new() -> Self {
        let b1 = lit(0.09646076681806523);
        let b2 = lit(0.01);
        let b3 = lit(0.4798896504144996);
        let b4 = lit(1.379008574103742);
        let b5 = lit(-3.290069515436099);
        let b6 = lit(2.324710524099774);

        // Published error weights (b - bhat) for Tsit5's embedded 4th-order
        // solution (Tsitouras 2011 / OrdinaryDiffEq.jl Tsit5Tableau).
        let btilde1 = lit(-0.00178001105222577714);
        let btilde2 = lit(-0.0008164344596567469);
        let btilde3 = lit(0.007880878010261995);
        let btilde4 = lit(-0.1447110071732629);
        let btilde5 = lit(0.5823571654525552);
        let btilde6 = lit(-0.45808210592918697);
        let btilde7: U = ratio(1.0, 66.0);

        Self {
            c2: lit(0.161),
            c3: lit(0.327),
            c4: lit(0.9),
            c5: lit(0.9800255409045097),
            a21: lit(0.161),
            a31: lit(-0.008480655492356989),
            a32: lit(0.335480655492357),
            a41: lit(2.898),
            a42: lit(-6.359447987781783),
            a43: lit(4.361447987781783),
            a51: lit(5.325864858437957),
            a52: lit(-11.748883564062828),
            a53: lit(7.495539342889693),
            a54: lit(-0.09249506636030195),
            a61: lit(5.86145544294642),
            a62: lit(-12.92096931784711),
            a63: lit(8.159367898576159),
            a64: lit(-0.071584973281401),
            a65: lit(-0.02826857949054663),
            a71: b1,
            a72: b2,
            a73: b3,
            a74: b4,
            a75: b5,
            a76: b6,
            b1,
            b2,
            b3,
            b4,
            b5,
            b6,
            bhat1: b1 - btilde1,
            bhat2: b2 - btilde2,
            bhat3: b3 - btilde3,
            bhat4: b4 - btilde4,
            bhat5: b5 - btilde5,
            bhat6: b6 - btilde6,
            bhat7: lit::<U>(0.0) - btilde7,
        }
    }
}

impl<U: Scalar> Default for Tsit5Tableau<U> {
    fn default() -> Self {
        Self::new()
    }
}

/// Bogacki-Shampine 5(4), the 8-stage double-embedded-estimator pair
/// (Bogacki & Shampine, "An efficient Runge-Kutta (4,5) pair", 1996).
/// `btilde_i = b_i - bhat_i`, the standard Hairer-convention embedded-pair
/// error weight.
pub struct Bs5Tableau<U> {
    pub c2: U,
    pub c3: U,
    pub c4: U,
    pub c5: U,
    pub c6: U,
    pub a21: U,
    pub a31: U,
    pub a32: U,
    pub a41: U,
    pub a42: U,
    pub a43: U,
    pub a51: U,
    pub a52: U,
    pub a53: U,
    pub a54: U,
    pub a61: U,
    pub a62: U,
    pub a63: U,
    pub a64: U,
    pub a65: U,
    pub a71: U,
    pub a72: U,
    pub a73: U,
    pub a74: U,
    pub a75: U,
    pub a76: U,
    pub a81: U,
    pub a83: U,
    pub a84: U,
    pub a85: U,
    pub a86: U,
    pub a87: U,
    pub b1: U,
    pub b3: U,
    pub b4: U,
    pub b5: U,
    pub b6: U,
    pub b7: U,
    pub bhat1: U,
    pub bhat3: U,
    pub bhat4: U,
    pub bhat5: U,
    pub bhat6: U,
    pub bhat7: U,
    pub bhat8: U,
    pub btilde1: U,
    pub btilde3: U,
    pub btilde4: U,
    pub btilde5: U,
    pub btilde6: U,
    pub btilde7: U,
    pub btilde8: U,
}

impl<U: Scalar> Bs5Tableau<U> {
    pub fn new() -> Self {
        let b1: U = ratio(587.0, 8064.0);
        let b3: U = ratio(4440339.0, 15491840.0);
        let b4: U = ratio(24353.0, 124800.0);
        let b5: U = ratio(387.0, 44800.0);
        let b6: U = ratio(2152.0, 5985.0);
        let b7: U = ratio(7267.0, 94080.0);

        let bhat1: U = ratio(2479.0, 34992.0);
        let bhat3: U = ratio(123.0, 416.0);
        let bhat4: U = ratio(612941.0, 3411720.0);
        let bhat5: U = ratio(43.0, 1440.0);
        let bhat6: U = ratio(2272.0, 6561.0);
        let bhat7: U = ratio(79937.0, 1113912.0);
        let bhat8: U = ratio(3293.0, 556956.0);

        Self {
            c2: ratio(1.0, 6.0),
            c3: ratio(2.0, 9.0),
            c4: ratio(3.0, 7.0),
            c5: ratio(2.0, 3.0),
            c6: ratio(3.0, 4.0),
            a21: ratio(1.0, 6.0),
            a31: ratio(2.0, 27.0),
            a32: ratio(4.0, 27.0),
            a41: ratio(183.0, 1372.0),
            a42: ratio(-162.0, 343.0),
            a43: ratio(1053.0, 1372.0),
            a51: ratio(68.0, 297.0),
            a52: ratio(-4.0, 11.0),
            a53: ratio(42.0, 143.0),
            a54: ratio(1960.0, 3861.0),
            a61: ratio(597.0, 22528.0),
            a62: ratio(81.0, 352.0),
            a63: ratio(63099.0, 585728.0),
            a64: ratio(58653.0, 366080.0),
            a65: ratio(4617.0, 20480.0),
            a71: ratio(174197.0, 959244.0),
            a72: ratio(-30942.0, 79937.0),
            a73: ratio(8152137.0, 19744439.0),
            a74: ratio(666106.0, 1039181.0),
            a75: ratio(-29421.0, 29068.0),
            a76: ratio(482048.0, 414219.0),
            a81: b1,
            a83: b3,
            a84: b4,
            a85: b5,
            a86: b6,
            a87: b7,
            b1,
            b3,
            b4,
            b5,
            b6,
            b7,
            bhat1,
            bhat3,
            bhat4,
            bhat5,
            bhat6,
            bhat7,
            bhat8,
            btilde1: b1 - bhat1,
            btilde3: b3 - bhat3,
            btilde4: b4 - bhat4,
            btilde5: b5 - bhat5,
            btilde6: b6 - bhat6,
            btilde7: b7 - bhat7,
            btilde8: lit::<U>(0.0) - bhat8,
        }
    }
}

impl<U: Scalar> Default for Bs5Tableau<U> {
    fn default() -> Self {
        Self::new()
    }
}
