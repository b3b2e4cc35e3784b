#![no_std]
#![no_main]

#[cfg(feature = "defmt")]
use defmt_rtt as _;
use panic_halt as _;

use core::cell::RefCell;

use clock_firmware::{ClockConfig, Foreground, LineAssembler, LoopbackBoard, SharedClock};
use embedded_hal::delay::DelayNs;
use riscv_rt::entry;

// Critical section over the global interrupt enable
struct RiscvCriticalSection;
critical_section::set_impl!(RiscvCriticalSection);

unsafe impl critical_section::Impl for RiscvCriticalSection {
    unsafe fn acquire() -> critical_section::RawRestoreState {
        let mstatus = riscv::register::mstatus::read();
        riscv::register::mstatus::clear_mie();
        mstatus.mie() as u8
    }

    unsafe fn release(was_enabled: critical_section::RawRestoreState) {
        if was_enabled != 0 {
            riscv::register::mstatus::set_mie();
        }
    }
}

// ========================================
// CH32V203 registers
// ========================================

/// HSI after reset, no PLL
const SYSCLK_HZ: u32 = 8_000_000;
const BAUD: u32 = 115_200;

const RCC_APB2PCENR: u32 = 0x4002_1018;
const GPIOA_CFGHR: u32 = 0x4001_0804;

const USART1_BASE: u32 = 0x4001_3800;
const USART_STATR: u32 = 0x00;
const USART_DATAR: u32 = 0x04;
const USART_BRR: u32 = 0x08;
const USART_CTLR1: u32 = 0x0C;
const STATR_RXNE: u32 = 1 << 5;
const STATR_TXE: u32 = 1 << 7;

const SYSTICK_BASE: u32 = 0xE000_F000;
const STK_CTLR: u32 = 0x00;
const STK_SR: u32 = 0x04;
const STK_CMPLR: u32 = 0x10;

const PFIC_IENR: u32 = 0xE000_E100;
const IRQ_SYSTICK: u32 = 12;
const IRQ_USART1: u32 = 53;

fn reg_read(addr: u32) -> u32 {
    unsafe { core::ptr::read_volatile(addr as *const u32) }
}

fn reg_write(addr: u32, value: u32) {
    unsafe { core::ptr::write_volatile(addr as *mut u32, value) }
}

fn reg_modify(addr: u32, f: impl FnOnce(u32) -> u32) {
    reg_write(addr, f(reg_read(addr)));
}

fn enable_irq(irq: u32) {
    reg_write(PFIC_IENR + 4 * (irq / 32), 1 << (irq % 32));
}

// ========================================
// Shared state
// ========================================

const CONFIG: ClockConfig = ClockConfig::DEFAULT;

static CLOCK: SharedClock = SharedClock::new(CONFIG);
static RX_LINE: critical_section::Mutex<RefCell<LineAssembler>> =
    critical_section::Mutex::new(RefCell::new(LineAssembler::new()));

/// Blocking USART1 transmitter
struct Usart1Tx;

impl core::fmt::Write for Usart1Tx {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        for byte in s.bytes() {
            while reg_read(USART1_BASE + USART_STATR) & STATR_TXE == 0 {}
            reg_write(USART1_BASE + USART_DATAR, byte as u32);
        }
        Ok(())
    }
}

/// Busy-wait delay counted in core cycles
struct CycleDelay;

impl DelayNs for CycleDelay {
    fn delay_ns(&mut self, ns: u32) {
        let cycles = (ns as u64 * SYSCLK_HZ as u64 / 1_000_000_000) as u32;
        unsafe { riscv::asm::delay(cycles) }
    }
}

// ========================================
// Initialization
// ========================================

/// PA9 TX, PA10 RX, 8N1 with receive interrupt
fn configure_usart1() {
    // IOPA (bit 2) and USART1 (bit 14)
    reg_modify(RCC_APB2PCENR, |v| v | (1 << 2) | (1 << 14));
    reg_modify(GPIOA_CFGHR, |v| {
        // PA9: AF push-pull 50 MHz, PA10: floating input
        (v & !(0xFF << 4)) | (0xB << 4) | (0x4 << 8)
    });
    reg_write(USART1_BASE + USART_BRR, SYSCLK_HZ / BAUD);
    // UE | RXNEIE | TE | RE
    reg_write(USART1_BASE + USART_CTLR1, (1 << 13) | (1 << 5) | (1 << 3) | (1 << 2));
    enable_irq(IRQ_USART1);
}

/// Periodic interrupt at the configured base rate
fn configure_systick() {
    reg_write(SYSTICK_BASE + STK_SR, 0);
    reg_write(SYSTICK_BASE + STK_CMPLR, SYSCLK_HZ / CONFIG.tick_hz - 1);
    reg_write(SYSTICK_BASE + STK_CMPLR + 4, 0);
    // STE | STIE | STCLK (HCLK) | STRE (auto reload)
    reg_write(SYSTICK_BASE + STK_CTLR, 0b1111);
    enable_irq(IRQ_SYSTICK);
}

#[entry]
fn main() -> ! {
    configure_usart1();

    #[cfg(feature = "defmt")]
    defmt::info!("clock firmware {}", clock_firmware::VERSION);

    // Expander bus bring-up is board specific; the loopback panel keeps
    // the display and switch paths alive until it is wired in. Its record
    // lives in RAM, so SAVE does not survive a reset on this build. Swap in
    // `ExpanderBoard` and `FlashStore` over the board's I2C and flash
    // peripherals to persist.
    let mut board = LoopbackBoard::new(Usart1Tx, CycleDelay);
    let mut foreground = Foreground::new(&CONFIG);
    foreground.boot(&CLOCK, &mut board);

    configure_systick();
    unsafe { riscv::register::mstatus::set_mie() };

    #[cfg(feature = "defmt")]
    defmt::info!("tick running at {} Hz", CONFIG.tick_hz);

    loop {
        foreground.poll(&CLOCK, &mut board);
    }
}

// ========================================
// Interrupt Handlers
// ========================================

#[no_mangle]
extern "C" fn SysTick() {
    reg_write(SYSTICK_BASE + STK_SR, 0);
    CLOCK.on_tick();
}

#[no_mangle]
extern "C" fn USART1_IRQHandler() {
    while reg_read(USART1_BASE + USART_STATR) & STATR_RXNE != 0 {
        let byte = (reg_read(USART1_BASE + USART_DATAR) & 0xFF) as u8;
        let line = critical_section::with(|cs| RX_LINE.borrow_ref_mut(cs).push(byte));
        if let Some(line) = line {
            CLOCK.on_line(&line);
        }
    }
}
